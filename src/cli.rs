use clap::Parser;
use miniview::files::DeleteMode;
use miniview::input::HELP_KEYS;

#[derive(Parser)]
#[command(name = "miniview", about = "A minimal image viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// Image file or directory to open
    pub path: Option<std::path::PathBuf>,

    /// Start in fullscreen
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Delete files permanently instead of moving them to the trash
    #[arg(long)]
    pub permanent: bool,
}

impl Cli {
    pub fn delete_mode(&self) -> DeleteMode {
        if self.permanent {
            DeleteMode::Permanent
        } else {
            DeleteMode::Trash
        }
    }
}
