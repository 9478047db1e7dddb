use pixelburst_core::{
    layout_blocks, BlockGrid, CanvasSize, Palette, PortraitParams, Rgba, Settings,
    TRANSPARENT_BLOCK,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn params(explode: bool) -> PortraitParams {
    PortraitParams {
        block_size: Some(10.0),
        pixels_wide: Some(4),
        total_colours: Some(2),
        base_colour: Some("#000000".into()),
        background_colour: Some("white".into()),
        explode_outer_blocks: Some(explode),
        explosion_level: Some(50.0),
        multiplier: Some(3.0),
        min_explode_distance: Some(0.0),
        use_random: Some(false),
        ..PortraitParams::default()
    }
}

#[test]
fn alternating_bands_lay_out_in_a_row() {
    let settings = Settings::from_params(&params(false)).unwrap();
    let palette = Palette::from_settings(&settings);
    let grid = BlockGrid::new(4, 1, vec![0, 1, 0, 1]).unwrap();
    let canvas = CanvasSize::for_grid(&grid, &settings);
    assert_eq!((canvas.width, canvas.height), (40, 10));

    let placements = layout_blocks(&grid, &settings, canvas, &mut StdRng::seed_from_u64(0));
    assert_eq!(placements.len(), 4);
    for (i, p) in placements.iter().enumerate() {
        assert_eq!(p.position.x, i as f64 * 10.0);
        assert_eq!(p.position.y, 0.0);
    }

    assert_eq!(palette.swatch(0).colour(), Rgba::WHITE);
    assert_eq!(palette.swatch(1).colour(), Rgba::BLACK);
}

#[test]
fn explosion_switch_contains_all_displacement() {
    let settings = Settings::from_params(&params(false)).unwrap();
    let grid = BlockGrid::new(8, 8, (0..64).map(|i| i % 2).collect()).unwrap();
    let canvas = CanvasSize::for_grid(&grid, &settings);
    let placements = layout_blocks(&grid, &settings, canvas, &mut StdRng::seed_from_u64(3));
    assert!(placements.iter().all(|p| p.position == p.origin && p.rotation == 0.0));

    let exploded = Settings::from_params(&params(true)).unwrap();
    let moved = layout_blocks(&grid, &exploded, canvas, &mut StdRng::seed_from_u64(3));
    assert!(moved.iter().any(|p| p.position != p.origin));
}

#[test]
fn fully_transparent_grid_has_nothing_to_draw() {
    let settings = Settings::from_params(&params(true)).unwrap();
    let grid = BlockGrid::new(3, 3, vec![TRANSPARENT_BLOCK; 9]).unwrap();
    let canvas = CanvasSize::for_grid(&grid, &settings);
    assert!(layout_blocks(&grid, &settings, canvas, &mut StdRng::seed_from_u64(0)).is_empty());
}

#[test]
fn deterministic_layout_without_jitter() {
    let settings = Settings::from_params(&params(true)).unwrap();
    let grid = BlockGrid::new(6, 4, vec![1; 24]).unwrap();
    let canvas = CanvasSize::for_grid(&grid, &settings);
    let a = layout_blocks(&grid, &settings, canvas, &mut StdRng::seed_from_u64(1));
    let b = layout_blocks(&grid, &settings, canvas, &mut StdRng::seed_from_u64(2));
    assert_eq!(a, b, "without jitter the rng must not influence the layout");
}
