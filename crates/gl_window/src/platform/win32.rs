//! Win32 + WGL platform
//!
//! One window class ("OpenGL") is registered per window. Native messages reach
//! `window_proc`, which looks the owning window's sink up by `HWND` in a
//! thread-local registry and forwards a translated [`Message`]. The sink is
//! handed over through a thread-local slot during `CreateWindowExW` and
//! claimed on `WM_NCCREATE`, so messages sent while the window is still being
//! created are routed too.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::{mem, ptr};

use winapi::shared::minwindef::{FALSE, HINSTANCE, LPARAM, LRESULT, TRUE, UINT, WPARAM};
use winapi::shared::windef::{HDC, HGLRC, HWND, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::wingdi::{
    wglCreateContext, wglDeleteContext, wglGetProcAddress, wglMakeCurrent, ChoosePixelFormat,
    SetPixelFormat, SwapBuffers, DEVMODEW, DM_BITSPERPEL, DM_PELSHEIGHT, DM_PELSWIDTH,
    PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA,
    PIXELFORMATDESCRIPTOR,
};
use winapi::um::winuser::{
    AdjustWindowRectEx, ChangeDisplaySettingsW, CreateWindowExW, DefWindowProcW, DestroyWindow,
    DispatchMessageW, GetDC, LoadCursorW, LoadIconW, PeekMessageW, PostQuitMessage,
    RegisterClassW, ReleaseDC, SetFocus, SetForegroundWindow, ShowCursor, ShowWindow,
    TranslateMessage, UnregisterClassW, CDS_FULLSCREEN, CS_HREDRAW, CS_OWNDC, CS_VREDRAW,
    DISP_CHANGE_SUCCESSFUL, IDC_ARROW, IDI_WINLOGO, MSG, PM_REMOVE, SW_SHOW, WM_ACTIVATE,
    WM_CLOSE, WM_CREATE, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEMOVE, WM_NCCREATE, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SIZE,
    WM_SYSCOMMAND, WNDCLASSW, WS_CLIPCHILDREN, WS_CLIPSIBLINGS, WS_EX_APPWINDOW,
    WS_EX_WINDOWEDGE, WS_OVERLAPPEDWINDOW, WS_POPUP,
};

use super::{OsError, OsResult, Platform, Pump, WindowSpec};
use crate::context::{ContextProfile, ContextRequest};
use crate::input::MouseButton;
use crate::message::{self, Dispatch, Message, SharedSink};

const CLASS_NAME: &str = "OpenGL";

const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
const WGL_CONTEXT_FLAGS_ARB: i32 = 0x2094;
const WGL_CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
const WGL_CONTEXT_DEBUG_BIT_ARB: i32 = 0x0001;
const WGL_CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0001;
const WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB: i32 = 0x0002;

type CreateContextAttribsArb = unsafe extern "system" fn(HDC, HGLRC, *const i32) -> HGLRC;

#[link(name = "opengl32")]
extern "system" {
    fn glGetError() -> u32;
}

thread_local! {
    /// Sink waiting to be claimed by the window being created
    static PENDING: RefCell<Option<SharedSink>> = const { RefCell::new(None) };
    /// Live windows on this thread, keyed by handle address
    static REGISTRY: RefCell<HashMap<usize, SharedSink>> = RefCell::new(HashMap::new());
}

/// Registered window class
#[derive(Debug, Clone, Copy)]
pub struct Win32Class {
    instance: HINSTANCE,
}

/// The Win32 + WGL [`Platform`]
#[derive(Debug)]
pub struct Win32Platform {
    class_name: Vec<u16>,
}

impl Win32Platform {
    /// Create the platform; nothing is acquired until a window is built
    pub fn new() -> Self {
        Self {
            class_name: wide(CLASS_NAME),
        }
    }

    /// Address of a GL or WGL extension function, valid while a context is current
    pub fn proc_address(name: &str) -> Option<*const c_void> {
        let name = std::ffi::CString::new(name).ok()?;
        let address = unsafe { wglGetProcAddress(name.as_ptr()) } as isize;
        // Some drivers return small sentinels instead of null on failure
        if matches!(address, -1 | 0 | 1 | 2 | 3) {
            None
        } else {
            Some(address as *const c_void)
        }
    }
}

impl Default for Win32Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for Win32Platform {
    type Class = Win32Class;
    type Window = HWND;
    type Device = HDC;
    type Context = HGLRC;

    fn register_class(&mut self) -> OsResult<Win32Class> {
        let instance = unsafe { GetModuleHandleW(ptr::null()) };
        let class = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW | CS_OWNDC,
            lpfnWndProc: Some(window_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: instance,
            hIcon: unsafe { LoadIconW(ptr::null_mut(), IDI_WINLOGO) },
            hCursor: unsafe { LoadCursorW(ptr::null_mut(), IDC_ARROW) },
            hbrBackground: ptr::null_mut(),
            lpszMenuName: ptr::null(),
            lpszClassName: self.class_name.as_ptr(),
        };

        if unsafe { RegisterClassW(&class) } == 0 {
            return Err(last_error());
        }
        Ok(Win32Class { instance })
    }

    fn unregister_class(&mut self, class: Win32Class) -> OsResult<()> {
        check(unsafe { UnregisterClassW(self.class_name.as_ptr(), class.instance) })
    }

    fn enable_fullscreen(&mut self, width: u32, height: u32, bits: u8) -> OsResult<()> {
        let mut mode: DEVMODEW = unsafe { mem::zeroed() };
        mode.dmSize = mem::size_of::<DEVMODEW>() as u16;
        mode.dmPelsWidth = width;
        mode.dmPelsHeight = height;
        mode.dmBitsPerPel = u32::from(bits);
        mode.dmFields = DM_BITSPERPEL | DM_PELSWIDTH | DM_PELSHEIGHT;

        let result = unsafe { ChangeDisplaySettingsW(&mut mode, CDS_FULLSCREEN) };
        if result == DISP_CHANGE_SUCCESSFUL {
            Ok(())
        } else {
            Err(OsError::new(result as u32))
        }
    }

    fn restore_display_mode(&mut self) -> OsResult<()> {
        let result = unsafe { ChangeDisplaySettingsW(ptr::null_mut(), 0) };
        if result == DISP_CHANGE_SUCCESSFUL {
            Ok(())
        } else {
            Err(OsError::new(result as u32))
        }
    }

    fn show_cursor(&mut self, visible: bool) {
        unsafe { ShowCursor(if visible { TRUE } else { FALSE }) };
    }

    fn create_window(
        &mut self,
        class: Win32Class,
        spec: &WindowSpec,
        sink: SharedSink,
    ) -> OsResult<HWND> {
        let (style, ex_style) = if spec.fullscreen {
            (WS_POPUP, WS_EX_APPWINDOW)
        } else {
            (WS_OVERLAPPEDWINDOW, WS_EX_APPWINDOW | WS_EX_WINDOWEDGE)
        };

        // Grow the outer rectangle so the client area gets the requested size
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: i32::try_from(spec.width).unwrap_or(i32::MAX),
            bottom: i32::try_from(spec.height).unwrap_or(i32::MAX),
        };
        unsafe { AdjustWindowRectEx(&mut rect, style, FALSE, ex_style) };

        let title = wide(&spec.title);
        PENDING.with(|pending| *pending.borrow_mut() = Some(sink));
        let hwnd = unsafe {
            CreateWindowExW(
                ex_style,
                self.class_name.as_ptr(),
                title.as_ptr(),
                style | WS_CLIPSIBLINGS | WS_CLIPCHILDREN,
                0,
                0,
                rect.right - rect.left,
                rect.bottom - rect.top,
                ptr::null_mut(),
                ptr::null_mut(),
                class.instance,
                ptr::null_mut(),
            )
        };
        let error = last_error();
        PENDING.with(|pending| pending.borrow_mut().take());

        if hwnd.is_null() {
            return Err(error);
        }
        Ok(hwnd)
    }

    fn destroy_window(&mut self, window: HWND) -> OsResult<()> {
        let result = check(unsafe { DestroyWindow(window) });
        REGISTRY.with(|registry| registry.borrow_mut().remove(&(window as usize)));
        result
    }

    fn show_window(&mut self, window: HWND) {
        unsafe {
            ShowWindow(window, SW_SHOW);
            SetForegroundWindow(window);
            SetFocus(window);
        }
    }

    fn device_context(&mut self, window: HWND) -> OsResult<HDC> {
        let device = unsafe { GetDC(window) };
        if device.is_null() {
            return Err(last_error());
        }
        Ok(device)
    }

    fn release_device_context(&mut self, window: HWND, device: HDC) -> OsResult<()> {
        check(unsafe { ReleaseDC(window, device) })
    }

    fn choose_pixel_format(&mut self, device: HDC, bits: u8) -> OsResult<i32> {
        let descriptor = pixel_format_descriptor(bits);
        let format = unsafe { ChoosePixelFormat(device, &descriptor) };
        if format == 0 {
            return Err(last_error());
        }
        Ok(format)
    }

    fn set_pixel_format(&mut self, device: HDC, format: i32, bits: u8) -> OsResult<()> {
        let descriptor = pixel_format_descriptor(bits);
        check(unsafe { SetPixelFormat(device, format, &descriptor) })
    }

    fn create_context(&mut self, device: HDC) -> OsResult<HGLRC> {
        let context = unsafe { wglCreateContext(device) };
        if context.is_null() {
            return Err(last_error());
        }
        Ok(context)
    }

    fn create_profile_context(&mut self, device: HDC, request: &ContextRequest) -> Option<HGLRC> {
        let address = Self::proc_address("wglCreateContextAttribsARB")?;
        let create: CreateContextAttribsArb = unsafe { mem::transmute(address) };

        let mut attributes = vec![
            WGL_CONTEXT_MAJOR_VERSION_ARB,
            i32::from(request.major),
            WGL_CONTEXT_MINOR_VERSION_ARB,
            i32::from(request.minor),
        ];
        if request.has_profile() {
            let mask = match request.profile {
                ContextProfile::Core => WGL_CONTEXT_CORE_PROFILE_BIT_ARB,
                ContextProfile::Compatibility => WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB,
            };
            attributes.extend([WGL_CONTEXT_PROFILE_MASK_ARB, mask]);
        }
        if request.debug {
            attributes.extend([WGL_CONTEXT_FLAGS_ARB, WGL_CONTEXT_DEBUG_BIT_ARB]);
        }
        attributes.push(0);

        let context = unsafe { create(device, ptr::null_mut(), attributes.as_ptr()) };
        if context.is_null() {
            None
        } else {
            Some(context)
        }
    }

    fn make_current(&mut self, current: Option<(HDC, HGLRC)>) -> OsResult<()> {
        let (device, context) = current.unwrap_or((ptr::null_mut(), ptr::null_mut()));
        check(unsafe { wglMakeCurrent(device, context) })
    }

    fn delete_context(&mut self, context: HGLRC) -> OsResult<()> {
        check(unsafe { wglDeleteContext(context) })
    }

    fn pump(&mut self) -> Pump {
        let mut msg: MSG = unsafe { mem::zeroed() };
        if unsafe { PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) } == 0 {
            return Pump::Empty;
        }
        if msg.message == WM_QUIT {
            return Pump::Quit;
        }
        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        Pump::Dispatched
    }

    fn post_quit(&mut self) {
        unsafe { PostQuitMessage(0) };
    }

    fn swap_buffers(&mut self, device: HDC) -> OsResult<()> {
        check(unsafe { SwapBuffers(device) })
    }

    fn gl_error(&mut self) -> u32 {
        unsafe { glGetError() }
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        if let Some(sink) = PENDING.with(|pending| pending.borrow_mut().take()) {
            REGISTRY.with(|registry| registry.borrow_mut().insert(hwnd as usize, sink));
        }
    }

    let sink = REGISTRY.with(|registry| registry.borrow().get(&(hwnd as usize)).cloned());
    let dispatch = sink.map_or(Dispatch::Default, |sink| {
        message::forward(&sink, &translate(msg, wparam, lparam))
    });

    match dispatch {
        Dispatch::Handled => 0,
        Dispatch::RequestQuit => {
            PostQuitMessage(0);
            0
        }
        Dispatch::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Translate a raw Win32 message into a [`Message`]
pub fn translate(msg: UINT, wparam: WPARAM, lparam: LPARAM) -> Message {
    let (x, y) = signed_coordinates(lparam);
    match msg {
        WM_CREATE => Message::Create,
        WM_ACTIVATE => Message::Activate {
            minimized: high_word(wparam as u32) != 0,
        },
        WM_SYSCOMMAND => Message::SysCommand(wparam as u32),
        WM_CLOSE => Message::Close,
        WM_KEYDOWN => Message::KeyDown(wparam as u32),
        WM_KEYUP => Message::KeyUp(wparam as u32),
        WM_LBUTTONDOWN => Message::MouseDown { button: MouseButton::Left, x, y },
        WM_RBUTTONDOWN => Message::MouseDown { button: MouseButton::Right, x, y },
        WM_MBUTTONDOWN => Message::MouseDown { button: MouseButton::Middle, x, y },
        WM_LBUTTONUP => Message::MouseUp { button: MouseButton::Left, x, y },
        WM_RBUTTONUP => Message::MouseUp { button: MouseButton::Right, x, y },
        WM_MBUTTONUP => Message::MouseUp { button: MouseButton::Middle, x, y },
        WM_MOUSEMOVE => Message::MouseMove { x, y },
        WM_SIZE => Message::Resize {
            width: u32::from(low_word(lparam as u32)),
            height: u32::from(high_word(lparam as u32)),
        },
        WM_QUIT => Message::Quit,
        other => Message::Other(other),
    }
}

const fn low_word(value: u32) -> u16 {
    (value & 0xFFFF) as u16
}

const fn high_word(value: u32) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Client coordinates packed in a mouse message; negative off the left/top edge
fn signed_coordinates(lparam: LPARAM) -> (i32, i32) {
    let packed = lparam as u32;
    (
        i32::from(low_word(packed) as i16),
        i32::from(high_word(packed) as i16),
    )
}

fn pixel_format_descriptor(bits: u8) -> PIXELFORMATDESCRIPTOR {
    let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    descriptor.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
    descriptor.nVersion = 1;
    descriptor.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | PFD_DOUBLEBUFFER;
    descriptor.iPixelType = PFD_TYPE_RGBA;
    descriptor.cColorBits = bits;
    descriptor.cDepthBits = 16;
    descriptor.cStencilBits = 8;
    descriptor.iLayerType = PFD_MAIN_PLANE;
    descriptor
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error() -> OsError {
    OsError::new(unsafe { GetLastError() })
}

fn check(result: i32) -> OsResult<()> {
    if result == 0 {
        Err(last_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(x: i16, y: i16) -> LPARAM {
        (((y as u16 as u32) << 16) | (x as u16 as u32)) as LPARAM
    }

    #[test]
    fn test_translate_mouse_buttons() {
        assert_eq!(
            translate(WM_RBUTTONDOWN, 0, pack(10, 20)),
            Message::MouseDown { button: MouseButton::Right, x: 10, y: 20 }
        );
        assert_eq!(
            translate(WM_MBUTTONUP, 0, pack(3, 4)),
            Message::MouseUp { button: MouseButton::Middle, x: 3, y: 4 }
        );
    }

    #[test]
    fn test_translate_negative_coordinates() {
        assert_eq!(
            translate(WM_MOUSEMOVE, 0, pack(-5, -7)),
            Message::MouseMove { x: -5, y: -7 }
        );
    }

    #[test]
    fn test_translate_size_and_activate() {
        assert_eq!(
            translate(WM_SIZE, 0, pack(1024, 768)),
            Message::Resize { width: 1024, height: 768 }
        );
        assert_eq!(
            translate(WM_ACTIVATE, 0x0001_0001, 0),
            Message::Activate { minimized: true }
        );
        assert_eq!(
            translate(WM_ACTIVATE, 0x0000_0001, 0),
            Message::Activate { minimized: false }
        );
    }

    #[test]
    fn test_translate_unknown_message() {
        assert_eq!(translate(0x0020, 0, 0), Message::Other(0x0020));
    }
}
