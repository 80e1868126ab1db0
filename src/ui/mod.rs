use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult};
use softbuffer::Surface;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

use miniview::files::IMAGE_EXTENSIONS;
use miniview::input::{Input, Key};
use miniview::viewer::APP_NAME;
use miniview::{Effect, Viewer};

use crate::ui::render::Canvas;

pub mod render;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub viewer: Viewer,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
    wheel: WheelNotches,
}

/// Pixels of touchpad scrolling that count as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 40.0;

/// Adds up fractional scroll amounts and hands out whole notches.
#[derive(Debug, Default)]
struct WheelNotches {
    pending: f32,
}

impl WheelNotches {
    /// Add `lines` of scrolling; returns the signed number of whole notches
    /// now complete. The remainder carries over to the next call.
    fn push(&mut self, lines: f32) -> i32 {
        if lines.signum() != self.pending.signum() {
            self.pending = 0.0;
        }
        self.pending += lines;
        let whole = self.pending.trunc();
        self.pending -= whole;
        whole as i32
    }

    fn reset(&mut self) {
        self.pending = 0.0;
    }
}

impl App {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            window: None,
            context: None,
            surface: None,
            wheel: WheelNotches::default(),
        }
    }

    fn request_redraw(&self) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn sync_title(&self) {
        if let Some(ref window) = self.window {
            window.set_title(&self.viewer.title());
        }
    }

    fn handle_input(&mut self, input: Input) {
        let effect = self.viewer.handle_input(input);
        self.apply_effect(effect);
        self.sync_title();
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Redraw => self.request_redraw(),
            Effect::Fullscreen(on) => {
                if let Some(ref window) = self.window {
                    window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
                }
                self.request_redraw();
            }
            Effect::OpenDialog => {
                if let Some(path) = pick_path() {
                    let effect = self.viewer.open_path(&path);
                    self.apply_effect(effect);
                }
            }
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return;
        };
        let size = window.inner_size();
        let fb_w = size.width.max(1);
        let fb_h = size.height.max(1);
        if let (Some(w), Some(h)) = (NonZeroU32::new(fb_w), NonZeroU32::new(fb_h)) {
            if let Err(e) = surface.resize(w, h) {
                log::warn!("surface resize failed: {}", e);
            }
        }
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                let mut canvas = Canvas::new(&mut buffer, fb_w, fb_h);
                render::draw_viewer(&mut canvas, &self.viewer);
                if let Err(e) = buffer.present() {
                    log::warn!("present failed: {}", e);
                }
            }
            Err(e) => log::warn!("no framebuffer: {}", e),
        }
    }
}

/// Ask for a folder first; "No" falls back to a single-file picker.
fn pick_path() -> Option<PathBuf> {
    let folder = MessageDialog::new()
        .set_title(APP_NAME)
        .set_description("Open a folder? (No = pick a single file)")
        .set_buttons(MessageButtons::YesNo)
        .show();

    if matches!(folder, MessageDialogResult::Yes) {
        FileDialog::new().set_title("Open folder").pick_folder()
    } else {
        FileDialog::new()
            .set_title("Open image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
    }
}

fn translate_key(key: &WinitKey) -> Option<Key> {
    let key = match key {
        WinitKey::Named(named) => match named {
            NamedKey::ArrowLeft => Key::Left,
            NamedKey::ArrowRight => Key::Right,
            NamedKey::Space => Key::Space,
            NamedKey::Backspace => Key::Backspace,
            NamedKey::Delete => Key::Delete,
            NamedKey::Enter => Key::Enter,
            NamedKey::Escape => Key::Escape,
            NamedKey::Home => Key::Home,
            NamedKey::End => Key::End,
            NamedKey::F2 => Key::F2,
            NamedKey::F11 => Key::F11,
            _ => return None,
        },
        WinitKey::Character(s) => Key::Char(s.chars().next()?),
        _ => return None,
    };
    Some(key)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.viewer.title())
            .with_inner_size(LogicalSize::new(1100u32, 700u32));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(Arc::clone(&window)).and_then(|context| {
            let surface = Surface::new(&context, Arc::clone(&window))?;
            Ok((context, surface))
        });
        let (context, surface) = match surface {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Cannot create drawing surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        if self.viewer.is_fullscreen() {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let (Some(surface), Some(w), Some(h)) = (
                    self.surface.as_mut(),
                    NonZeroU32::new(width.max(1)),
                    NonZeroU32::new(height.max(1)),
                ) {
                    if let Err(e) = surface.resize(w, h) {
                        log::warn!("surface resize failed: {}", e);
                    }
                }
                self.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(key) = translate_key(&event.logical_key) {
                    self.handle_input(Input::Key(key));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => {
                    self.wheel.reset();
                    self.handle_input(Input::Wheel(y));
                }
                MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                    let notches = self.wheel.push(y as f32 / PIXELS_PER_NOTCH);
                    for _ in 0..notches.unsigned_abs() {
                        self.handle_input(Input::Wheel(notches.signum() as f32));
                    }
                }
            },

            WindowEvent::RedrawRequested => self.render(),

            _ => {}
        }
    }
}
