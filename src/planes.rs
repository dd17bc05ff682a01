//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane, along with the two shapes
//! that describe those rectangles and the grid of escape counts a
//! render produces over them.
//!
//! Row 0 of every grid in this crate is the *bottom* of the plane,
//! the row nearest `ymin`.
use crate::errors::{RenderError, Result};
use itertools::iproduct;
use num::Complex;
use std::ops::Index;

/// Describes the real bounds of the rectangle of the complex plane
/// being sampled, treating the real part as the x-component and the
/// imaginary part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge (smallest real part)
    pub xmin: f64,
    /// Right edge (largest real part)
    pub xmax: f64,
    /// Bottom edge (smallest imaginary part)
    pub ymin: f64,
    /// Top edge (largest imaginary part)
    pub ymax: f64,
}

impl Viewport {
    /// Constructor.  Fails unless all four bounds are finite and the
    /// rectangle has positive, finite width and height.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Viewport> {
        let viewport = Viewport {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        viewport.validate()?;
        Ok(viewport)
    }

    /// Build a viewport from its left-lower and right-upper corners.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Result<Viewport> {
        Viewport::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// The fields are public, so anything that consumes a viewport
    /// re-checks it before dispatch.
    pub fn validate(&self) -> Result<()> {
        // Finite bounds can still overflow: -1e308..1.7e308 has an
        // infinite width, and column 0 would then map to NaN.
        let finite = [self.xmin, self.xmax, self.ymin, self.ymax]
            .iter()
            .chain(&[self.width(), self.height()])
            .all(|v| v.is_finite());
        if !finite || !(self.xmin < self.xmax) || !(self.ymin < self.ymax) {
            return Err(RenderError::InvalidViewport {
                xmin: self.xmin,
                xmax: self.xmax,
                ymin: self.ymin,
                ymax: self.ymax,
            });
        }
        Ok(())
    }

    /// The center of the viewport; the quadrants' shared corner when
    /// the grid has even dimensions.
    pub fn midpoint(&self) -> Complex<f64> {
        Complex::new((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Describes the width and height of an integral plane that is
/// assumed to start at 0,0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleGrid {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
}

impl SampleGrid {
    /// Both dimensions must be positive.
    pub fn new(width: usize, height: usize) -> Result<SampleGrid> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(SampleGrid { width, height })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the integral plane has no points.  Only the
    /// near halves of a one-pixel-wide split can be empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Describes the column, row of a point on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels on an integral plane onto the complex plane with
/// half-open linear spacing:
///
/// ```text
/// re = xmin + column * (xmax - xmin) / width
/// im = ymin + row    * (ymax - ymin) / height
/// ```
///
/// A mapper can also describe a *window* onto a larger lattice: the
/// window's pixel (0, 0) is the parent's pixel `origin`, and every
/// sample is computed with the parent's arithmetic, so a quadrant
/// samples exactly the points the full image would have.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The complex rectangle the lattice spans.
    pub viewport: Viewport,
    /// The pixel dimensions of the full lattice.
    pub lattice: SampleGrid,
    /// Where this window's first pixel sits in the full lattice.
    pub origin: Pixel,
    /// The pixel dimensions of this window.
    pub extent: SampleGrid,
}

impl PlaneMapper {
    /// A mapper over the whole of `lattice`.
    pub fn new(viewport: Viewport, lattice: SampleGrid) -> PlaneMapper {
        PlaneMapper {
            viewport,
            lattice,
            origin: Pixel(0, 0),
            extent: lattice,
        }
    }

    /// A sub-rectangle of this mapper's lattice, `extent` pixels in
    /// size, starting at `origin` relative to this mapper's origin.
    pub fn window(&self, origin: Pixel, extent: SampleGrid) -> PlaneMapper {
        PlaneMapper {
            viewport: self.viewport,
            lattice: self.lattice,
            origin: Pixel(self.origin.0 + origin.0, self.origin.1 + origin.1),
            extent,
        }
    }

    /// The number of pixels in this window.
    pub fn len(&self) -> usize {
        self.extent.len()
    }

    /// Describes that the window has no pixels.
    pub fn is_empty(&self) -> bool {
        self.extent.is_empty()
    }

    /// Given the column and row of a pixel in this window, return the
    /// complex number it samples.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let column = (self.origin.0 + pixel.0) as f64;
        let row = (self.origin.1 + pixel.1) as f64;
        Complex::new(
            self.viewport.xmin + column * self.viewport.width() / (self.lattice.width as f64),
            self.viewport.ymin + row * self.viewport.height() / (self.lattice.height as f64),
        )
    }
}

/// A row-major grid of escape counts.  Filled once by whoever renders
/// it and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountGrid {
    width: usize,
    height: usize,
    counts: Vec<u32>,
}

impl CountGrid {
    /// Wrap a finished buffer.  The buffer must hold exactly
    /// `width * height` counts.
    pub fn from_vec(width: usize, height: usize, counts: Vec<u32>) -> Result<CountGrid> {
        if counts.len() != width * height {
            return Err(RenderError::ShapeMismatch(format!(
                "{} counts cannot fill a {}x{} grid",
                counts.len(),
                width,
                height
            )));
        }
        Ok(CountGrid {
            width,
            height,
            counts,
        })
    }

    /// Fill a grid by calling `count(row, column)` for every cell,
    /// bottom row first.
    pub fn from_fn<F>(width: usize, height: usize, mut count: F) -> CountGrid
    where
        F: FnMut(usize, usize) -> u32,
    {
        let counts = iproduct!(0..height, 0..width)
            .map(|(row, column)| count(row, column))
            .collect();
        CountGrid {
            width,
            height,
            counts,
        }
    }

    /// A grid holding `value` everywhere.
    pub fn filled(width: usize, height: usize, value: u32) -> CountGrid {
        CountGrid {
            width,
            height,
            counts: vec![value; width * height],
        }
    }

    /// Columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// One row, bottom row first.
    pub fn row(&self, row: usize) -> &[u32] {
        &self.counts[row * self.width..(row + 1) * self.width]
    }

    /// Every row, from the bottom of the plane up.  Reverse it to read
    /// the grid the way it would appear on screen.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u32]> + '_ {
        (0..self.height).map(move |row| self.row(row))
    }

    /// The raw row-major buffer.
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    /// Give up the raw row-major buffer.
    pub fn into_vec(self) -> Vec<u32> {
        self.counts
    }
}

/// Indexed by `(row, column)`.
impl Index<(usize, usize)> for CountGrid {
    type Output = u32;

    fn index(&self, (row, column): (usize, usize)) -> &u32 {
        assert!(column < self.width, "column {} out of range", column);
        &self.counts[row * self.width + column]
    }
}
