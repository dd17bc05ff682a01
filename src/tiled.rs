// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Block-tiled renderer
//!
//! The second execution model: no quadrants, just one launch of a flat
//! two-dimensional grid of fixed-size thread blocks, one logical
//! thread per pixel.  The block grid is sized by ceiling division to
//! cover the whole image, so the last row and column of blocks may
//! overhang it; threads that land outside the image are turned away
//! by the kernel's boundary guard and write nothing.
//!
//! The `Device` executes the launch on a set of host execution units
//! that pull whole blocks off a shared queue.  The order blocks and
//! threads run in is unspecified and doesn't matter, since every
//! thread owns exactly one output cell.  A launch is synchronous: the
//! grid is only handed back once every unit has finished, and if any
//! unit fails the launch fails as a whole.

use crate::errors::{panic_message, RenderError, Result};
use crate::escape::{check_limit, escape_count};
use crate::planes::{CountGrid, Pixel, PlaneMapper, SampleGrid, Viewport};
use crossbeam::thread::ScopedJoinHandle;
use itertools::iproduct;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// An x (columns) by y (rows) extent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dim2 {
    /// Columns
    pub x: usize,
    /// Rows
    pub y: usize,
}

/// 16x16 threads per block.
pub const DEFAULT_BLOCK: Dim2 = Dim2 { x: 16, y: 16 };

/// How a launch is laid out: enough blocks of `threads_per_block` to
/// cover `grid`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Blocks along each axis
    pub blocks: Dim2,
    /// Threads along each axis of a block
    pub threads_per_block: Dim2,
    /// The output the launch writes
    pub grid: SampleGrid,
}

impl LaunchConfig {
    /// The smallest block grid that covers `grid`.
    pub fn covering(grid: SampleGrid, threads_per_block: Dim2) -> Result<LaunchConfig> {
        if threads_per_block.x == 0 || threads_per_block.y == 0 {
            return Err(RenderError::InvalidDimensions {
                width: threads_per_block.x,
                height: threads_per_block.y,
            });
        }
        Ok(LaunchConfig {
            blocks: Dim2 {
                x: (grid.width + threads_per_block.x - 1) / threads_per_block.x,
                y: (grid.height + threads_per_block.y - 1) / threads_per_block.y,
            },
            threads_per_block,
            grid,
        })
    }

    /// Logical threads in the whole launch, overhang included.
    pub fn threads(&self) -> usize {
        self.blocks.x * self.blocks.y * self.threads_per_block.x * self.threads_per_block.y
    }
}

/// A parallel execution device.  Acquired once, launched as often as
/// needed; it holds no state between launches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Device {
    units: usize,
}

impl Device {
    /// Acquire a device with `units` execution units.
    pub fn acquire(units: usize) -> Result<Device> {
        if units == 0 {
            warn!("Device initialization failed: no execution units");
            return Err(RenderError::DeviceUnavailable(
                "no execution units available".to_string(),
            ));
        }
        Ok(Device { units })
    }

    /// A device with one execution unit per host CPU.
    pub fn host() -> Result<Device> {
        Device::acquire(num_cpus::get())
    }

    /// Number of execution units.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Run `kernel` once for every logical thread of `config`, then
    /// wait for all of them.  The kernel gets the thread's global
    /// column and row and returns the count for that cell, or `None`
    /// if its boundary guard turned the thread away.  A kernel that
    /// answers for a cell outside the grid faults the launch.
    pub fn launch<K>(&self, config: &LaunchConfig, kernel: K) -> Result<CountGrid>
    where
        K: Fn(usize, usize) -> Option<u32> + Sync,
    {
        let blocks = Arc::new(Mutex::new(iproduct!(0..config.blocks.y, 0..config.blocks.x)));
        let block = config.threads_per_block;
        let kernel = &kernel;

        let cells = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Vec<(usize, usize, u32)>>> = (0..self.units)
                .map(|_| {
                    let blocks = blocks.clone();
                    spawner.spawn(move |_| {
                        let mut cells = vec![];
                        loop {
                            let next = { blocks.lock().ok().and_then(|mut b| b.next()) };
                            let (block_y, block_x) = match next {
                                Some(index) => index,
                                None => {
                                    break;
                                }
                            };
                            for (thread_y, thread_x) in iproduct!(0..block.y, 0..block.x) {
                                let column = block_x * block.x + thread_x;
                                let row = block_y * block.y + thread_y;
                                if let Some(count) = kernel(column, row) {
                                    cells.push((column, row, count));
                                }
                            }
                        }
                        cells
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<std::thread::Result<Vec<_>>>()
        })
        .and_then(|joined| joined)
        .map_err(|payload| RenderError::DeviceFault(panic_message(&*payload)))?;

        let (width, height) = (config.grid.width, config.grid.height);
        let mut counts = vec![0; width * height];
        let mut written = 0;
        for (column, row, count) in cells.into_iter().flatten() {
            if column >= width || row >= height {
                return Err(RenderError::DeviceFault(format!(
                    "thread ({}, {}) wrote outside the {}x{} grid",
                    column, row, width, height
                )));
            }
            counts[row * width + column] = count;
            written += 1;
        }
        if written != width * height {
            return Err(RenderError::DeviceFault(format!(
                "{} of {} cells were written",
                written,
                width * height
            )));
        }
        CountGrid::from_vec(width, height, counts)
    }
}

/// Renders a whole viewport in one launch, one thread per pixel,
/// every pixel mapped across the full viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TiledKernelComputer {
    device: Device,
    threads_per_block: Dim2,
}

impl TiledKernelComputer {
    /// Use `device` with 16x16 blocks.
    pub fn new(device: Device) -> TiledKernelComputer {
        TiledKernelComputer {
            device,
            threads_per_block: DEFAULT_BLOCK,
        }
    }

    /// Use `device` with some other block shape.
    pub fn with_block(device: Device, threads_per_block: Dim2) -> Result<TiledKernelComputer> {
        if threads_per_block.x == 0 || threads_per_block.y == 0 {
            return Err(RenderError::InvalidDimensions {
                width: threads_per_block.x,
                height: threads_per_block.y,
            });
        }
        Ok(TiledKernelComputer {
            device,
            threads_per_block,
        })
    }

    /// The block shape launches use.
    pub fn threads_per_block(&self) -> Dim2 {
        self.threads_per_block
    }

    /// Render `viewport` at `grid` resolution.
    pub fn compute(&self, viewport: &Viewport, grid: SampleGrid, max_iter: u32) -> Result<CountGrid> {
        viewport.validate()?;
        let grid = SampleGrid::new(grid.width, grid.height)?;
        check_limit(max_iter)?;

        let config = LaunchConfig::covering(grid, self.threads_per_block)?;
        let plane = PlaneMapper::new(*viewport, grid);
        let start = Instant::now();
        let image = self.device.launch(&config, |column, row| {
            if column < grid.width && row < grid.height {
                Some(escape_count(plane.pixel_to_point(&Pixel(column, row)), max_iter))
            } else {
                None
            }
        })?;
        info!(
            "Tiled computation time: {:.2?} ({}x{} blocks of {}x{} on {} units)",
            start.elapsed(),
            config.blocks.x,
            config.blocks.y,
            config.threads_per_block.x,
            config.threads_per_block.y,
            self.device.units()
        );
        Ok(image)
    }
}
