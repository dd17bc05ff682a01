// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Where each quadrant lives in the finished image, and the routine
//! that stitches four quadrant grids back into one.
//!
//! The placement is a table, not a list order: `LAYOUT` says which
//! half of the rows and which half of the columns each named quadrant
//! occupies.  The bottom half of the plane comes first in row order,
//! so row 0 of the assembled grid is the bottom of the plane, and
//! within a half the left quadrant comes before the right one.  The
//! same table drives the split in `regions`, so the two can't drift
//! apart.

use crate::errors::{RenderError, Result};
use crate::planes::CountGrid;
use std::fmt;

/// One of the four named sub-rectangles of a viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    /// xmin..x_mid, ymin..y_mid
    BottomLeft,
    /// x_mid..xmax, ymin..y_mid
    BottomRight,
    /// xmin..x_mid, y_mid..ymax
    TopLeft,
    /// x_mid..xmax, y_mid..ymax
    TopRight,
}

impl Quadrant {
    /// All four, in layout order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];

    /// The name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Quadrant::BottomLeft => "Bottom-left",
            Quadrant::BottomRight => "Bottom-right",
            Quadrant::TopLeft => "Top-left",
            Quadrant::TopRight => "Top-right",
        }
    }

    /// This quadrant's entry in `LAYOUT`.
    pub fn placement(self) -> Placement {
        LAYOUT[self as usize]
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which half of an axis a quadrant occupies.  `Near` is the half
/// holding the axis minimum (left columns, bottom rows) and gets the
/// floor of an odd split; `Far` absorbs the remainder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Half {
    /// Left columns or bottom rows
    Near,
    /// Right columns or top rows
    Far,
}

/// A quadrant's position in the assembled grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Which quadrant
    pub quadrant: Quadrant,
    /// Which half of the rows it fills
    pub rows: Half,
    /// Which half of the columns it fills
    pub columns: Half,
}

/// The layout-to-grid-position table, indexed by `Quadrant as usize`.
pub const LAYOUT: [Placement; 4] = [
    Placement {
        quadrant: Quadrant::BottomLeft,
        rows: Half::Near,
        columns: Half::Near,
    },
    Placement {
        quadrant: Quadrant::BottomRight,
        rows: Half::Near,
        columns: Half::Far,
    },
    Placement {
        quadrant: Quadrant::TopLeft,
        rows: Half::Far,
        columns: Half::Near,
    },
    Placement {
        quadrant: Quadrant::TopRight,
        rows: Half::Far,
        columns: Half::Far,
    },
];

fn slot(rows: Half, columns: Half) -> usize {
    match (rows, columns) {
        (Half::Near, Half::Near) => Quadrant::BottomLeft as usize,
        (Half::Near, Half::Far) => Quadrant::BottomRight as usize,
        (Half::Far, Half::Near) => Quadrant::TopLeft as usize,
        (Half::Far, Half::Far) => Quadrant::TopRight as usize,
    }
}

fn mismatch<T>(message: String) -> Result<T> {
    Err(RenderError::ShapeMismatch(message))
}

/// Given exactly one grid per quadrant, in any order, stitch them into
/// the full image.  Quadrants sharing a column half must agree on
/// width, and quadrants sharing a row half must agree on height;
/// anything else is a programming error upstream and fails with
/// `ShapeMismatch`.
pub fn assemble(parts: Vec<(Quadrant, CountGrid)>) -> Result<CountGrid> {
    if parts.len() != LAYOUT.len() {
        return mismatch(format!(
            "expected {} quadrant grids, got {}",
            LAYOUT.len(),
            parts.len()
        ));
    }

    let mut slots: [Option<CountGrid>; 4] = [None, None, None, None];
    for (quadrant, grid) in parts {
        let entry = &mut slots[quadrant as usize];
        if entry.is_some() {
            return mismatch(format!("{} supplied more than once", quadrant));
        }
        *entry = Some(grid);
    }
    // Four parts, no duplicates: every slot is filled.
    let slots: Vec<CountGrid> = slots.iter_mut().filter_map(Option::take).collect();
    let at = |rows: Half, columns: Half| &slots[slot(rows, columns)];

    for &columns in &[Half::Near, Half::Far] {
        let (bottom, top) = (at(Half::Near, columns), at(Half::Far, columns));
        if bottom.width() != top.width() {
            return mismatch(format!(
                "column half {:?} is {} wide at the bottom but {} wide at the top",
                columns,
                bottom.width(),
                top.width()
            ));
        }
    }
    for &rows in &[Half::Near, Half::Far] {
        let (left, right) = (at(rows, Half::Near), at(rows, Half::Far));
        if left.height() != right.height() {
            return mismatch(format!(
                "row half {:?} is {} tall on the left but {} tall on the right",
                rows,
                left.height(),
                right.height()
            ));
        }
    }

    let width = at(Half::Near, Half::Near).width() + at(Half::Near, Half::Far).width();
    let height = at(Half::Near, Half::Near).height() + at(Half::Far, Half::Near).height();
    let mut counts = Vec::with_capacity(width * height);
    for &rows in &[Half::Near, Half::Far] {
        let (left, right) = (at(rows, Half::Near), at(rows, Half::Far));
        for (l, r) in left.rows().zip(right.rows()) {
            counts.extend_from_slice(l);
            counts.extend_from_slice(r);
        }
    }
    CountGrid::from_vec(width, height, counts)
}
