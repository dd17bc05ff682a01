// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time recurrence.  Both the quadrant renderer and the
//! tiled renderer call exactly this function, so the two can only
//! disagree if they disagree about which point they're sampling.

use crate::errors::{RenderError, Result};
use num::Complex;

/// |z|² beyond which a point is known to diverge (radius 2).
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Iterate `z = z * z + c` from zero.  Before every update, check
/// whether `z` has left the circle of radius two; return the number
/// of updates completed when it has, or `max_iter` if it never does
/// within the bound.  A point already outside the circle escapes on
/// the first update and reports 1; the origin never escapes.
#[inline]
pub fn escape_count(c: Complex<f64>, max_iter: u32) -> u32 {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    for n in 0..max_iter {
        if z.norm_sqr() > ESCAPE_RADIUS_SQR {
            return n;
        }
        z = z * z + c;
    }
    max_iter
}

pub(crate) fn check_limit(max_iter: u32) -> Result<u32> {
    if max_iter == 0 {
        return Err(RenderError::InvalidIterationLimit);
    }
    Ok(max_iter)
}
