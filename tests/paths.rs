extern crate num;
extern crate quadbrot;
extern crate rand;

use num::Complex;
use quadbrot::tiled::{Device, Dim2, TiledKernelComputer};
use quadbrot::{
    assemble, compute_region_grid, compute_region_grid_with, compute_tiled_grid, escape_count,
    CountGrid, Quadrant, RenderError, SampleGrid, Selection, Viewport,
};
use rand::Rng;

fn viewport(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Viewport {
    Viewport::new(xmin, xmax, ymin, ymax).unwrap()
}

#[test]
fn golden_four_by_four() {
    let vp = viewport(-2.0, 2.0, -2.0, 2.0);
    let expected = CountGrid::from_vec(
        4,
        4,
        vec![
            1, 1, 2, 1, // im = -2
            1, 3, 10, 2, // im = -1
            10, 10, 10, 3, // im = 0
            1, 3, 10, 2, // im = 1
        ],
    )
    .unwrap();
    assert_eq!(compute_region_grid(&vp, 4, 4, 10).unwrap(), expected);
    assert_eq!(compute_tiled_grid(&vp, 4, 4, 10).unwrap(), expected);
}

#[test]
fn inside_the_set_everything_hits_the_bound() {
    let vp = viewport(-0.1, 0.1, -0.1, 0.1);
    for grid in &[
        compute_region_grid(&vp, 16, 16, 50).unwrap(),
        compute_tiled_grid(&vp, 16, 16, 50).unwrap(),
    ] {
        assert_eq!((grid.height(), grid.width()), (16, 16));
        assert!(grid.as_slice().iter().all(|&v| v == 50));
    }
}

#[test]
fn far_outside_everything_escapes_immediately() {
    let vp = viewport(10.0, 11.0, 10.0, 11.0);
    for grid in &[
        compute_region_grid(&vp, 12, 8, 50).unwrap(),
        compute_tiled_grid(&vp, 12, 8, 50).unwrap(),
    ] {
        assert!(grid.as_slice().iter().all(|&v| v <= 1));
    }
}

#[test]
fn both_engines_agree_cell_for_cell() {
    let mut rng = rand::thread_rng();
    for _ in 0..12 {
        let xmin = rng.gen_range(-2.5, 0.5);
        let ymin = rng.gen_range(-1.5, 1.0);
        let span = rng.gen_range(0.001, 2.0);
        let vp = viewport(xmin, xmin + span, ymin, ymin + span * 0.75);
        let width = rng.gen_range(1, 70);
        let height = rng.gen_range(1, 50);
        let workers = rng.gen_range(1, 5);
        let max_iter = rng.gen_range(1, 200);

        let regions = compute_region_grid_with(workers, &vp, width, height, max_iter).unwrap();
        let tiled = compute_tiled_grid(&vp, width, height, max_iter).unwrap();
        assert_eq!(
            regions, tiled,
            "{:?} at {}x{}, {} iterations",
            vp, width, height, max_iter
        );
    }
}

#[test]
fn even_dimensions_agree_across_block_shapes() {
    let vp = viewport(-0.75, -0.73, 0.1, 0.12);
    let regions = compute_region_grid_with(4, &vp, 64, 48, 500).unwrap();
    let grid = SampleGrid::new(64, 48).unwrap();
    for &(x, y) in &[(16, 16), (32, 8), (7, 9)] {
        let tiled = TiledKernelComputer::with_block(Device::acquire(3).unwrap(), Dim2 { x, y })
            .unwrap()
            .compute(&vp, grid, 500)
            .unwrap();
        assert_eq!(regions, tiled);
    }
}

#[test]
fn single_row_and_single_column_grids() {
    let vp = viewport(-2.0, 1.0, -1.5, 1.5);
    for &(width, height) in &[(1, 1), (1, 9), (9, 1)] {
        let regions = compute_region_grid(&vp, width, height, 25).unwrap();
        let tiled = compute_tiled_grid(&vp, width, height, 25).unwrap();
        assert_eq!((regions.width(), regions.height()), (width, height));
        assert_eq!(regions, tiled);
    }
}

#[test]
fn renders_are_deterministic() {
    let vp = viewport(-1.5, -1.0, -0.25, 0.25);
    let first = compute_region_grid_with(2, &vp, 30, 30, 300).unwrap();
    for _ in 0..3 {
        assert_eq!(compute_region_grid_with(2, &vp, 30, 30, 300).unwrap(), first);
    }

    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let c = Complex::new(rng.gen_range(-2.5, 1.0), rng.gen_range(-1.5, 1.5));
        assert_eq!(escape_count(c, 250), escape_count(c, 250));
    }
}

#[test]
fn counts_never_exceed_the_bound() {
    let vp = viewport(-2.0, 1.0, -1.5, 1.5);
    let grid = compute_tiled_grid(&vp, 40, 30, 17).unwrap();
    assert!(grid.as_slice().iter().all(|&v| v <= 17));
    assert!(grid.as_slice().iter().any(|&v| v == 17));
    assert!(grid.as_slice().iter().any(|&v| v < 17));
}

#[test]
fn bottom_rows_come_first() {
    // The lower half of this viewport is outside the set, the upper half
    // straddles the main cardioid.
    let vp = viewport(-0.5, 0.0, -3.0, 0.5);
    let grid = compute_region_grid(&vp, 8, 8, 40).unwrap();
    assert!(grid.row(0).iter().all(|&v| v == 1));
    assert!(grid.row(7).iter().all(|&v| v == 40));
}

#[test]
fn constant_quadrants_make_a_constant_image() {
    let parts = Quadrant::ALL
        .iter()
        .map(|&q| (q, CountGrid::filled(5, 4, 9)))
        .collect();
    let grid = assemble(parts).unwrap();
    assert_eq!((grid.height(), grid.width()), (8, 10));
    assert!(grid.as_slice().iter().all(|&v| v == 9));
}

#[test]
fn bad_requests_fail_before_dispatch() {
    let vp = viewport(-2.0, 1.0, -1.5, 1.5);
    assert_eq!(
        compute_region_grid(&vp, 0, 4, 10),
        Err(RenderError::InvalidDimensions {
            width: 0,
            height: 4
        })
    );
    assert!(compute_tiled_grid(&vp, 4, 0, 10).is_err());
    assert_eq!(
        compute_tiled_grid(&vp, 4, 4, 0),
        Err(RenderError::InvalidIterationLimit)
    );
    assert_eq!(
        compute_region_grid_with(0, &vp, 4, 4, 10),
        Err(RenderError::InvalidWorkerCount)
    );

    let inverted = Viewport {
        xmin: 0.0,
        xmax: -1.0,
        ymin: 0.0,
        ymax: 1.0,
    };
    match compute_region_grid(&inverted, 4, 4, 10) {
        Err(RenderError::InvalidViewport { .. }) => {}
        other => panic!("expected InvalidViewport, got {:?}", other),
    }
    match compute_tiled_grid(&inverted, 4, 4, 10) {
        Err(RenderError::InvalidViewport { .. }) => {}
        other => panic!("expected InvalidViewport, got {:?}", other),
    }
}

#[test]
fn overflowing_viewport_is_rejected_not_rendered() {
    // Every bound is finite, the width is not.
    let huge = Viewport {
        xmin: -1e308,
        xmax: 1.7e308,
        ymin: -1.0,
        ymax: 1.0,
    };
    match compute_region_grid(&huge, 4, 2, 10) {
        Err(RenderError::InvalidViewport { .. }) => {}
        other => panic!("expected InvalidViewport, got {:?}", other),
    }
    match compute_tiled_grid(&huge, 4, 2, 10) {
        Err(RenderError::InvalidViewport { .. }) => {}
        other => panic!("expected InvalidViewport, got {:?}", other),
    }
}

#[test]
fn committed_selection_drives_a_render() {
    let mut selection = Selection::Idle;
    selection.press(Complex::new(0.1, 0.1));
    selection.drag(Complex::new(0.0, 0.0));
    let vp = selection.release(Complex::new(-0.1, -0.1)).unwrap();
    let grid = compute_region_grid(&vp, 6, 6, 50).unwrap();
    assert!(grid.as_slice().iter().all(|&v| v == 50));
}
