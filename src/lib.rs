#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quadbrot: a Mandelbrot escape-count renderer with two engines
//!
//! Every point `c` of the complex plane gets a number: how many times
//! `z = z * z + c`, starting from zero, can be applied before `z`
//! leaves the circle of radius two, capped at some maximum.  Sample a
//! rectangle of the plane on a pixel grid and those numbers make an
//! image, once somebody downstream colors them in.  This crate stops
//! at the numbers.
//!
//! There are two ways to get them:
//!
//! * The *quadrant* engine cuts the viewport into four regions near
//!   its midpoints, renders the four independently on a pool of
//!   workers, and stitches the results back together in a fixed
//!   layout.
//!
//! * The *tiled* engine launches one logical thread per pixel,
//!   organized into a flat grid of 16x16 blocks, on a parallel device.
//!
//! Both sample exactly the same lattice and call exactly the same
//! escape function, so they produce identical grids; the choice
//! between them is purely a question of speed.  Row 0 of every grid is
//! the bottom of the plane.

#[macro_use]
extern crate log;
extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod assemble;
pub mod errors;
pub mod escape;
pub mod planes;
pub mod regions;
pub mod selection;
pub mod tiled;

pub use crate::assemble::{assemble, Quadrant};
pub use crate::errors::{RenderError, Result};
pub use crate::escape::escape_count;
pub use crate::planes::{CountGrid, PlaneMapper, SampleGrid, Viewport};
pub use crate::regions::{RegionComputer, RegionRender, RegionReport};
pub use crate::selection::Selection;
pub use crate::tiled::{Device, TiledKernelComputer};

/// Render with the quadrant engine on a single worker.
pub fn compute_region_grid(
    viewport: &Viewport,
    width: usize,
    height: usize,
    max_iter: u32,
) -> Result<CountGrid> {
    compute_region_grid_with(1, viewport, width, height, max_iter)
}

/// Render with the quadrant engine on `workers` workers.
pub fn compute_region_grid_with(
    workers: usize,
    viewport: &Viewport,
    width: usize,
    height: usize,
    max_iter: u32,
) -> Result<CountGrid> {
    let grid = SampleGrid::new(width, height)?;
    let render = RegionComputer::new(workers)?.render(viewport, grid, max_iter)?;
    Ok(render.grid)
}

/// Render with the tiled engine on a host-sized device, 16x16 blocks.
pub fn compute_tiled_grid(
    viewport: &Viewport,
    width: usize,
    height: usize,
    max_iter: u32,
) -> Result<CountGrid> {
    let grid = SampleGrid::new(width, height)?;
    TiledKernelComputer::new(Device::host()?).compute(viewport, grid, max_iter)
}
