//! Key echo smoke test
//!
//! Opens a window, logs every key press and release, and exits on Escape or
//! when the window is closed.

use std::cell::Cell;
use std::rc::Rc;

use gl_window::prelude::*;

const CONFIG_PATH: &str = "window.toml";

#[cfg(windows)]
type AppWindow = NativeWindow;
#[cfg(not(windows))]
type AppWindow = Window<HeadlessPlatform>;

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
        Message::KeyDown(keys::ascii('h')),
        Message::KeyUp(keys::ascii('h')),
        Message::KeyDown(keys::ascii('i')),
        Message::KeyUp(keys::ascii('i')),
        Message::KeyDown(keys::ESCAPE),
    ]);
    Window::new(params, platform)
}

/// Printable name of a virtual-key code
fn key_name(key: u32) -> String {
    match key {
        keys::ESCAPE => "Escape".to_string(),
        keys::SPACE => "Space".to_string(),
        keys::ENTER => "Enter".to_string(),
        keys::BACK => "Backspace".to_string(),
        keys::TAB => "Tab".to_string(),
        keys::LEFT => "Left".to_string(),
        keys::UP => "Up".to_string(),
        keys::RIGHT => "Right".to_string(),
        keys::DOWN => "Down".to_string(),
        k if (keys::F1..keys::F1 + 12).contains(&k) => format!("F{}", k - keys::F1 + 1),
        k => char::from_u32(k)
            .filter(char::is_ascii_alphanumeric)
            .map_or_else(|| format!("{k:#04x}"), String::from),
    }
}

fn run() -> Result<(), WindowError> {
    let params = WindowParams::load_or_default(CONFIG_PATH)?.with_title("Key echo");
    let mut window = open_window(&params)?;

    let escape = Rc::new(Cell::new(false));
    let escape_pressed = escape.clone();

    window.on_key_down(move |key| {
        log::info!("Key down: {}", key_name(key.key));
        if key.is(keys::ESCAPE) {
            escape_pressed.set(true);
        }
    });
    window.on_key_up(|key| log::info!("Key up: {}", key_name(key.key)));
    window.on_activate(|active| log::info!("Window {}", if active { "activated" } else { "minimized" }));

    loop {
        window.display()?;
        if escape.replace(false) {
            window.close();
        }
        if !window.process() {
            break;
        }
    }

    window.destroy()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    gl_window::logging::init();

    log::info!("Starting key echo, press Escape to quit");

    match run() {
        Ok(()) => {
            log::info!("Key echo finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Key echo failed: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(keys::ESCAPE), "Escape");
        assert_eq!(key_name(keys::ascii('q')), "Q");
        assert_eq!(key_name(keys::ascii('7')), "7");
        assert_eq!(key_name(keys::F1 + 4), "F5");
        assert_eq!(key_name(0x5B), "0x5b");
    }
}
