//! The handful of fixed-function GL 1.1 calls the demos draw with
//!
//! opengl32 exports these directly, so no loader is needed. Every function
//! here requires a current GL context on the calling thread.

#![allow(unsafe_code)]

use std::os::raw::c_void;

use crate::pixels::PixelScatter;

const GL_DEPTH_TEST: u32 = 0x0B71;
const GL_PROJECTION: u32 = 0x1701;
const GL_MODELVIEW: u32 = 0x1700;
const GL_COLOR_BUFFER_BIT: u32 = 0x4000;
const GL_RGB: u32 = 0x1907;
const GL_UNSIGNED_BYTE: u32 = 0x1401;

#[link(name = "opengl32")]
extern "system" {
    fn glDisable(cap: u32);
    fn glMatrixMode(mode: u32);
    fn glLoadIdentity();
    fn glOrtho(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64);
    fn glViewport(x: i32, y: i32, width: i32, height: i32);
    fn glClearColor(red: f32, green: f32, blue: f32, alpha: f32);
    fn glClear(mask: u32);
    fn glRasterPos2i(x: i32, y: i32);
    fn glDrawPixels(width: i32, height: i32, format: u32, kind: u32, pixels: *const c_void);
}

/// Map GL coordinates one-to-one onto window pixels, origin top-left
pub fn pixel_projection(width: u32, height: u32) {
    let w = i32::try_from(width).unwrap_or(i32::MAX);
    let h = i32::try_from(height).unwrap_or(i32::MAX);
    unsafe {
        glDisable(GL_DEPTH_TEST);
        glViewport(0, 0, w, h);
        glMatrixMode(GL_PROJECTION);
        glLoadIdentity();
        glOrtho(0.0, f64::from(width), f64::from(height), 0.0, -1.0, 1.0);
        glMatrixMode(GL_MODELVIEW);
        glLoadIdentity();
    }
}

/// Clear the color buffer to black
pub fn clear() {
    unsafe {
        glClearColor(0.0, 0.0, 0.0, 1.0);
        glClear(GL_COLOR_BUFFER_BIT);
    }
}

/// Draw every point of the scatter as one pixel
pub fn draw_scatter(scatter: &PixelScatter) {
    let color = scatter.color().as_ptr().cast::<c_void>();
    for &(x, y) in scatter.points() {
        unsafe {
            glRasterPos2i(x, y);
            glDrawPixels(1, 1, GL_RGB, GL_UNSIGNED_BYTE, color);
        }
    }
}
