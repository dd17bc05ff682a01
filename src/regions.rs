// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quadrant renderer
//!
//! Splits a viewport into four quadrant regions, renders each
//! region's escape counts independently, and hands the results to the
//! assembler.  Each region is a self-contained description of its
//! own work, carrying its own slice of the sample lattice, so a worker
//! needs nothing but the region to do its job and returns its grid by
//! value.  Nothing is shared between workers except the queue they
//! pull regions from.
//!
//! The split is in pixels: the near halves (left, bottom) get the
//! floor of `width / 2` and `height / 2`, the far halves absorb the
//! remainder of an odd dimension.  The bounds follow the pixels: the
//! cut sits at the first sample of the far halves, which is the
//! viewport's midpoint when the dimension is even and half a pixel
//! short of it when it is odd.  Every region samples the same lattice
//! the full image would, starting at its own lower bounds, so the
//! quadrant image is identical to a single full-viewport pass.

use crate::assemble::{assemble, Half, Quadrant, LAYOUT};
use crate::errors::{panic_message, RenderError, Result};
use crate::escape::{check_limit, escape_count};
use crate::planes::{CountGrid, Pixel, PlaneMapper, SampleGrid, Viewport};
use crossbeam::thread::ScopedJoinHandle;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// One quadrant's worth of work.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    /// Which quadrant of the parent this is
    pub quadrant: Quadrant,
    /// The quadrant's corner of the parent viewport, cut where the
    /// parent's lattice passes from the near half to the far half
    pub bounds: Viewport,
    /// Columns in this region
    pub width: usize,
    /// Rows in this region
    pub height: usize,
    /// Iteration bound for every sample
    pub max_iter: u32,
    /// This region's window onto the parent's sample lattice
    pub plane: PlaneMapper,
}

/// Divide `viewport` into its four quadrants, in layout order.
pub fn split(viewport: &Viewport, grid: SampleGrid, max_iter: u32) -> [Region; 4] {
    let parent = PlaneMapper::new(*viewport, grid);
    let near = (grid.width / 2, grid.height / 2);
    let cut = parent.pixel_to_point(&Pixel(near.0, near.1));

    let region = |index: usize| {
        let placement = LAYOUT[index];
        let (column, width, xmin, xmax) = match placement.columns {
            Half::Near => (0, near.0, viewport.xmin, cut.re),
            Half::Far => (near.0, grid.width - near.0, cut.re, viewport.xmax),
        };
        let (row, height, ymin, ymax) = match placement.rows {
            Half::Near => (0, near.1, viewport.ymin, cut.im),
            Half::Far => (near.1, grid.height - near.1, cut.im, viewport.ymax),
        };
        Region {
            quadrant: placement.quadrant,
            bounds: Viewport {
                xmin,
                xmax,
                ymin,
                ymax,
            },
            width,
            height,
            max_iter,
            plane: parent.window(Pixel(column, row), SampleGrid { width, height }),
        }
    };
    [region(0), region(1), region(2), region(3)]
}

/// What a worker reports about a region it rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionReport {
    /// Which quadrant
    pub quadrant: Quadrant,
    /// Index of the pool worker that rendered it
    pub worker: usize,
    /// The OS-level thread behind that worker
    pub thread: ThreadId,
    /// Wall-clock time spent on the region
    pub elapsed: Duration,
}

/// A rendered region, owned by whoever holds it until assembly.
#[derive(Clone, Debug)]
pub struct RegionGrid {
    /// The counts, `region.height` rows of `region.width`
    pub grid: CountGrid,
    /// Timing and worker identity
    pub report: RegionReport,
}

/// Render one region.  `worker` is only used for the report.
pub fn compute_region(region: &Region, worker: usize) -> RegionGrid {
    let start = Instant::now();
    let grid = CountGrid::from_fn(region.width, region.height, |row, column| {
        escape_count(region.plane.pixel_to_point(&Pixel(column, row)), region.max_iter)
    });
    let elapsed = start.elapsed();
    let thread = thread::current().id();
    info!(
        "Region: {}, computation time: {:.2?}, worker: {} ({:?})",
        region.quadrant, elapsed, worker, thread
    );
    RegionGrid {
        grid,
        report: RegionReport {
            quadrant: region.quadrant,
            worker,
            thread,
            elapsed,
        },
    }
}

/// The assembled image and what each worker reported along the way.
#[derive(Clone, Debug)]
pub struct RegionRender {
    /// The full image
    pub grid: CountGrid,
    /// One report per quadrant, in layout order
    pub reports: Vec<RegionReport>,
    /// Wall-clock time for the whole render, assembly included
    pub elapsed: Duration,
}

/// A fixed-size pool of region workers.  The number of workers only
/// changes how long a render takes, never what it produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegionComputer {
    workers: usize,
}

impl RegionComputer {
    /// A pool of `workers` threads; at least one.
    pub fn new(workers: usize) -> Result<RegionComputer> {
        if workers == 0 {
            return Err(RenderError::InvalidWorkerCount);
        }
        Ok(RegionComputer { workers })
    }

    /// Degree of parallelism.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render every region, blocking until all of them are finished.
    /// Results come back in the order the regions were given.  If any
    /// worker dies the whole batch fails; nothing partial is returned.
    pub fn compute_regions(&self, regions: &[Region]) -> Result<Vec<RegionGrid>> {
        let queue = Arc::new(Mutex::new(regions.iter().enumerate()));

        let finished = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Vec<(usize, RegionGrid)>>> = (0..self.workers)
                .map(|worker| {
                    let queue = queue.clone();
                    spawner.spawn(move |_| {
                        let mut done = vec![];
                        loop {
                            let next = { queue.lock().ok().and_then(|mut q| q.next()) };
                            match next {
                                Some((index, region)) => {
                                    done.push((index, compute_region(region, worker)))
                                }
                                None => {
                                    break;
                                }
                            }
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<std::thread::Result<Vec<_>>>()
        })
        .and_then(|joined| joined)
        .map_err(|payload| RenderError::WorkerFailed(panic_message(&*payload)))?;

        let mut finished: Vec<(usize, RegionGrid)> = finished.into_iter().flatten().collect();
        if finished.len() != regions.len() {
            return Err(RenderError::WorkerFailed(format!(
                "{} of {} regions came back",
                finished.len(),
                regions.len()
            )));
        }
        finished.sort_by_key(|(index, _)| *index);
        Ok(finished.into_iter().map(|(_, grid)| grid).collect())
    }

    /// Split, render, and assemble a full image.
    pub fn render(&self, viewport: &Viewport, grid: SampleGrid, max_iter: u32) -> Result<RegionRender> {
        viewport.validate()?;
        SampleGrid::new(grid.width, grid.height)?;
        check_limit(max_iter)?;

        let start = Instant::now();
        let regions = split(viewport, grid, max_iter);
        let rendered = self.compute_regions(&regions)?;
        let reports = rendered.iter().map(|r| r.report.clone()).collect();
        let parts = regions
            .iter()
            .zip(rendered)
            .map(|(region, rendered)| (region.quadrant, rendered.grid))
            .collect();
        let image = assemble(parts)?;
        let elapsed = start.elapsed();
        info!(
            "Worker count: {}, computation time: {:.2?}",
            self.workers, elapsed
        );
        Ok(RegionRender {
            grid: image,
            reports,
            elapsed,
        })
    }
}
