mod cli;
mod ui;

use clap::Parser;
use winit::event_loop::EventLoop;

use miniview::Viewer;

use crate::cli::Cli;
use crate::ui::App;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut viewer = Viewer::new(cli.delete_mode());
    viewer.set_fullscreen(cli.fullscreen);
    if let Some(path) = &cli.path {
        viewer.open_path(path);
        log::info!("{}", viewer.status());
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Cannot create event loop: {}", e);
            return;
        }
    };

    let mut app = App::new(viewer);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {}", e);
    }
}
