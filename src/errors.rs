// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The failures a render request can surface.  None of these are
//! retried internally; every one of them reaches the caller, and no
//! render ever hands back a partial or zero-filled grid in place of
//! an error.

use failure::Fail;
use std::any::Any;

/// Everything that can go wrong while rendering.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// The viewport is empty, inverted, or not finite.
    #[fail(
        display = "Invalid viewport: x {}..{}, y {}..{} (need finite xmin < xmax and ymin < ymax)",
        xmin, xmax, ymin, ymax
    )]
    InvalidViewport {
        /// Left edge of the rejected viewport
        xmin: f64,
        /// Right edge of the rejected viewport
        xmax: f64,
        /// Bottom edge of the rejected viewport
        ymin: f64,
        /// Top edge of the rejected viewport
        ymax: f64,
    },

    /// Pixel dimensions must both be positive.
    #[fail(display = "Invalid dimensions: {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width in pixels
        width: usize,
        /// Requested height in pixels
        height: usize,
    },

    /// The iteration bound must be at least one.
    #[fail(display = "Iteration limit must be at least 1")]
    InvalidIterationLimit,

    /// A worker pool needs at least one worker.
    #[fail(display = "Worker count must be at least 1")]
    InvalidWorkerCount,

    /// The quadrant grids handed to the assembler do not fit together.
    #[fail(display = "Quadrant shape mismatch: {}", _0)]
    ShapeMismatch(String),

    /// The tiled execution device could not be acquired.
    #[fail(display = "Device unavailable: {}", _0)]
    DeviceUnavailable(String),

    /// An execution unit of the device failed mid-launch.
    #[fail(display = "Device fault: {}", _0)]
    DeviceFault(String),

    /// A region worker died before returning its grid.
    #[fail(display = "Region worker failed: {}", _0)]
    WorkerFailed(String),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Pull something printable out of a thread's panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    match payload.downcast_ref::<String>() {
        Some(message) => message.clone(),
        None => "unknown panic".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_values() {
        let e = RenderError::InvalidDimensions {
            width: 0,
            height: 7,
        };
        assert_eq!(format!("{}", e), "Invalid dimensions: 0x7");
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(17_u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
