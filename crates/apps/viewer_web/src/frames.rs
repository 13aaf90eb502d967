use runtime::frame::{FrameHandle, FrameScheduler};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::log;

/// `requestAnimationFrame` with one long-lived callback.
pub struct RafFrames {
    window: web_sys::Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl RafFrames {
    pub fn new(window: web_sys::Window, callback: Closure<dyn FnMut(f64)>) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for RafFrames {
    fn request_frame(&mut self) -> FrameHandle {
        match self
            .window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
        {
            Ok(id) => FrameHandle(id as u64),
            Err(err) => {
                log(&format!("requestAnimationFrame failed: {:?}", err));
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            log(&format!("cancelAnimationFrame failed: {:?}", err));
        }
    }
}
