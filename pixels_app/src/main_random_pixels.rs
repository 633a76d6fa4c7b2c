//! Random pixels demo
//!
//! Scatters 500 red pixels over the window and redraws them every frame until
//! the window is closed. Window parameters come from `window.toml` when present.
//!
//! Without a native backend the demo runs on the headless platform with a
//! short scripted session, which exercises the same callbacks.

#[cfg(windows)]
mod gl;
mod pixels;

use std::cell::Cell;
use std::rc::Rc;

use gl_window::prelude::*;
use rand::thread_rng;

use pixels::PixelScatter;

const PIXEL_COUNT: usize = 500;
const CONFIG_PATH: &str = "window.toml";

#[cfg(windows)]
type AppWindow = NativeWindow;
#[cfg(not(windows))]
type AppWindow = Window<HeadlessPlatform>;

fn load_params() -> WindowParams {
    match WindowParams::load_or_default(CONFIG_PATH) {
        Ok(params) => params,
        Err(e) => {
            log::warn!("Ignoring {CONFIG_PATH}: {e}");
            WindowParams::default()
        }
    }
}

#[cfg(windows)]
fn open_window(params: &WindowParams) -> Result<AppWindow, CreateError> {
    Window::open(params)
}

#[cfg(not(windows))]
fn open_window(params: &WindowParams) -> Result<AppWindow, CreateError> {
    use gl_window::message::Message;

    log::info!("No native backend on this host, running a scripted headless session");
    let platform = HeadlessPlatform::new();
    platform.probe().push_all([
        Message::MouseMove { x: 10, y: 20 },
        Message::Resize { width: params.width / 2, height: params.height / 2 },
        Message::KeyDown(keys::SPACE),
        Message::KeyUp(keys::SPACE),
        Message::Close,
    ]);
    Window::new(params, platform)
}

fn run() -> Result<(), WindowError> {
    let params = load_params();
    let mut window = open_window(&params)?;

    let scatter = PixelScatter::random(PIXEL_COUNT, window.size(), &mut thread_rng());
    log::info!(
        "Scattered {} pixels over {}x{}",
        scatter.points().len(),
        window.size_x(),
        window.size_y()
    );

    let frames = Rc::new(Cell::new(0_u64));
    let frame_counter = frames.clone();

    #[cfg(windows)]
    {
        gl::pixel_projection(window.size_x(), window.size_y());
        window.on_resize(gl::pixel_projection);
        window.on_draw(move || {
            gl::clear();
            gl::draw_scatter(&scatter);
            frame_counter.set(frame_counter.get() + 1);
        });
    }
    #[cfg(not(windows))]
    {
        window.on_resize(|w, h| log::info!("Resized to {w}x{h}"));
        window.on_draw(move || {
            log::trace!("Drawing {} pixels of {:?}", scatter.points().len(), scatter.color());
            frame_counter.set(frame_counter.get() + 1);
        });
    }

    window.on_key_down(|key| log::debug!("Key down: {:#04x}", key.key));

    window.run()?;
    log::info!("Drew {} frames", frames.get());

    window.destroy()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    gl_window::logging::init();

    log::info!("Starting random pixels demo");

    match run() {
        Ok(()) => {
            log::info!("Random pixels demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Random pixels demo failed: {e}");
            Err(e.into())
        }
    }
}
