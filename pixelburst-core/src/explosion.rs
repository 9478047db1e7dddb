//! Block layout and the radial "explosion" displacement.
//!
//! Every block starts at its grid position. When the explosion is enabled,
//! blocks further than a minimum radius from the explosion centre are pushed
//! outwards (and optionally rotated) by an amount that grows with the square
//! of their distance beyond that radius.

use rand::Rng;
use tracing::debug;

use crate::blocks::BlockGrid;
use crate::geometry::{axis_distances, point_on_circle, Point};
use crate::settings::{ExplosionSettings, Settings};

/// Rotation, in degrees, for a block at full vertical displacement fraction
/// and explosion level 1.
const ROTATION_PER_LEVEL: f64 = 45.0;

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Output raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// The fixed size from `settings`, or the grid scaled by the block size.
    /// Never smaller than 1×1.
    pub fn for_grid(grid: &BlockGrid, settings: &Settings) -> Self {
        if let Some((width, height)) = settings.canvas_size {
            return Self { width, height };
        }
        let scale = |cells: u32| ((cells as f64 * settings.block_size).round() as u32).max(1);
        Self {
            width: scale(grid.width),
            height: scale(grid.height),
        }
    }
}

// ---------------------------------------------------------------------------
// Explosion field
// ---------------------------------------------------------------------------

/// How far a single block sits beyond the minimum radius, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    /// Horizontal distance from the min-radius circle over the explosion span.
    pub fraction_x: f64,
    /// Vertical distance from the min-radius circle over the explosion span.
    pub fraction_y: f64,
    /// `-1.0` left of the centre, else `1.0`.
    pub direction_x: f64,
    /// `-1.0` above the centre, else `1.0`.
    pub direction_y: f64,
}

impl Displacement {
    /// Rotation in degrees, driven by the vertical fraction.
    pub fn rotation(&self, explosion: &ExplosionSettings) -> f64 {
        if explosion.use_rotation {
            explosion.level * self.fraction_y * ROTATION_PER_LEVEL
        } else {
            0.0
        }
    }

    /// Unsigned offset along one axis for a block of `block_size`.
    pub fn axis_offset(fraction: f64, block_size: f64, explosion: &ExplosionSettings) -> f64 {
        if fraction > 0.0 {
            block_size * explosion.level * (fraction * fraction * explosion.multiplier)
        } else {
            0.0
        }
    }
}

/// The explosion geometry for one output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionField {
    pub center: Point,
    /// Blocks at or inside this radius do not move.
    pub min_radius: f64,
    /// Span between the min radius and the furthest horizontal edge.
    /// Zero when the min radius reaches the edge.
    pub max_distance: f64,
}

impl ExplosionField {
    pub fn new(explosion: &ExplosionSettings, canvas: CanvasSize) -> Self {
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let center = Point::new((explosion.from_x * w).round(), (explosion.from_y * h).round());
        let min_radius = explosion.min_distance * w;
        let max_radius = center.x.max(w - center.x);
        Self {
            center,
            min_radius,
            max_distance: (max_radius - min_radius).max(0.0),
        }
    }

    /// Displacement for a block whose undisplaced top-left corner is
    /// `origin`. `None` on or inside the min radius, and everywhere when the
    /// field has no span.
    pub fn displacement(&self, origin: Point) -> Option<Displacement> {
        if origin.distance_to(self.center) <= self.min_radius || self.max_distance <= 0.0 {
            return None;
        }
        let on_circle = point_on_circle(self.center, self.min_radius, origin);
        let (dx, dy) = axis_distances(origin, on_circle);
        Some(Displacement {
            fraction_x: dx / self.max_distance,
            fraction_y: dy / self.max_distance,
            direction_x: if origin.x - self.center.x < 0.0 { -1.0 } else { 1.0 },
            direction_y: if origin.y - self.center.y < 0.0 { -1.0 } else { 1.0 },
        })
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where and how one block is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPlacement {
    /// Cell index in the grid.
    pub index: usize,
    pub swatch_index: usize,
    /// Undisplaced top-left corner.
    pub origin: Point,
    /// Final top-left corner.
    pub position: Point,
    /// Degrees, clockwise, about the block centre.
    pub rotation: f64,
    pub displaced: bool,
}

/// Lay out every drawable block of `grid` on a canvas of `canvas` size.
///
/// Transparent cells, and cells of swatch 0 when `remove_lightest_colour`
/// is set, produce no placement. `rng` is only consulted when the explosion
/// is enabled with `use_random`, once per displaced axis.
pub fn layout_blocks<R: Rng + ?Sized>(
    grid: &BlockGrid,
    settings: &Settings,
    canvas: CanvasSize,
    rng: &mut R,
) -> Vec<BlockPlacement> {
    let explosion = &settings.explosion;
    let field = ExplosionField::new(explosion, canvas);
    let block_size = settings.block_size;

    debug!(
        center_x = field.center.x,
        center_y = field.center.y,
        min_radius = field.min_radius,
        max_distance = field.max_distance,
        enabled = explosion.enabled,
        "Explosion field"
    );

    let mut placements = Vec::with_capacity(grid.len());
    for index in 0..grid.len() {
        let Some(swatch_index) = grid.block(index) else {
            continue;
        };
        if settings.remove_lightest_colour && swatch_index == 0 {
            continue;
        }

        let (col, row) = grid.position(index);
        let origin = Point::new(col as f64 * block_size, row as f64 * block_size);

        let displacement = if explosion.enabled {
            field.displacement(origin)
        } else {
            None
        };

        let (position, rotation) = match displacement {
            Some(d) => {
                let mut jitter = |fraction: f64| {
                    if explosion.use_random && fraction > 0.0 {
                        rng.gen::<f64>()
                    } else {
                        1.0
                    }
                };
                let jx = jitter(d.fraction_x);
                let jy = jitter(d.fraction_y);
                let ox = Displacement::axis_offset(d.fraction_x, block_size, explosion);
                let oy = Displacement::axis_offset(d.fraction_y, block_size, explosion);
                (
                    Point::new(origin.x + ox * d.direction_x * jx, origin.y + oy * d.direction_y * jy),
                    d.rotation(explosion),
                )
            }
            None => (origin, 0.0),
        };

        placements.push(BlockPlacement {
            index,
            swatch_index,
            origin,
            position,
            rotation,
            displaced: displacement.is_some(),
        });
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(explode: bool) -> Settings {
        let mut s = Settings::default();
        s.block_size = 10.0;
        s.explosion = ExplosionSettings {
            enabled: explode,
            from_x: 0.5,
            from_y: 0.5,
            min_distance: 0.3,
            level: 2.0,
            multiplier: 1.0,
            use_rotation: true,
            use_random: false,
        };
        s
    }

    fn canvas() -> CanvasSize {
        CanvasSize {
            width: 100,
            height: 100,
        }
    }

    #[test]
    fn field_geometry() {
        let f = ExplosionField::new(&settings(true).explosion, canvas());
        assert_eq!(f.center, Point::new(50.0, 50.0));
        assert!((f.min_radius - 30.0).abs() < 1e-9);
        assert!((f.max_distance - 20.0).abs() < 1e-9);
    }

    #[test]
    fn no_displacement_on_or_inside_min_radius() {
        let f = ExplosionField::new(&settings(true).explosion, canvas());
        assert!(f.displacement(Point::new(50.0, 50.0)).is_none());
        assert!(f.displacement(Point::new(20.0, 50.0)).is_none(), "exactly on the radius");
        assert!(f.displacement(Point::new(19.0, 50.0)).is_some());
    }

    #[test]
    fn displacement_points_away_from_centre() {
        let f = ExplosionField::new(&settings(true).explosion, canvas());
        let d = f.displacement(Point::new(0.0, 50.0)).unwrap();
        assert_eq!(d.direction_x, -1.0);
        assert!((d.fraction_x - 1.0).abs() < 1e-9);
        assert!(d.fraction_y.abs() < 1e-9);

        let d = f.displacement(Point::new(90.0, 90.0)).unwrap();
        assert_eq!((d.direction_x, d.direction_y), (1.0, 1.0));
        assert!(d.fraction_x > 0.0 && d.fraction_y > 0.0);
    }

    #[test]
    fn collapsed_field_never_displaces() {
        let mut s = settings(true);
        s.explosion.min_distance = 1.0;
        let f = ExplosionField::new(&s.explosion, canvas());
        assert_eq!(f.max_distance, 0.0);
        assert!(f.displacement(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn offsets_grow_quadratically() {
        let e = settings(true).explosion;
        let a = Displacement::axis_offset(0.25, 10.0, &e);
        let b = Displacement::axis_offset(0.5, 10.0, &e);
        assert!((b / a - 4.0).abs() < 1e-9);
        assert_eq!(Displacement::axis_offset(0.0, 10.0, &e), 0.0);
    }

    #[test]
    fn layout_displaces_left_edge_block() {
        let s = settings(true);
        let grid = BlockGrid::new(10, 10, vec![0; 100]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let placements = layout_blocks(&grid, &s, canvas(), &mut rng);
        assert_eq!(placements.len(), 100);

        // Cell (0, 5): origin (0, 50), fraction_x 1 → offset 10·2·1 = 20 to the left.
        let p = placements[50];
        assert!(p.displaced);
        assert!((p.position.x + 20.0).abs() < 1e-9);
        assert!((p.position.y - 50.0).abs() < 1e-9);
        assert!(p.rotation.abs() < 1e-9);
    }

    #[test]
    fn vertical_displacement_drives_rotation() {
        let s = settings(true);
        let grid = BlockGrid::new(10, 10, vec![0; 100]).unwrap();
        let placements = layout_blocks(&grid, &s, canvas(), &mut StdRng::seed_from_u64(1));

        // Cell (5, 0): origin (50, 0) projects to (50, 20), so fraction_y = 20 / 20.
        let top = placements[5];
        assert!(top.displaced);
        assert!((top.rotation - 2.0 * 1.0 * 45.0).abs() < 1e-9, "rotation {}", top.rotation);
        assert!((top.position.x - 50.0).abs() < 1e-9);
        assert!((top.position.y + 20.0).abs() < 1e-9, "pushed 10·2·1 upwards");

        // Cell (9, 9): origin (90, 90) projects to 50 + 30/√2 on each axis.
        let corner = placements[99];
        let fraction_y = (40.0 - 30.0 / 2f64.sqrt()) / 20.0;
        assert!((corner.rotation - 2.0 * fraction_y * 45.0).abs() < 1e-2, "rotation {}", corner.rotation);

        let mut flat = s.clone();
        flat.explosion.use_rotation = false;
        let unrotated = layout_blocks(&grid, &flat, canvas(), &mut StdRng::seed_from_u64(1));
        assert_eq!(unrotated[5].rotation, 0.0);
        assert_eq!(unrotated[5].position, top.position);
    }

    #[test]
    fn disabled_explosion_keeps_grid_positions() {
        let s = settings(false);
        let grid = BlockGrid::new(10, 10, vec![1; 100]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for p in layout_blocks(&grid, &s, canvas(), &mut rng) {
            assert_eq!(p.position, p.origin);
            assert_eq!(p.rotation, 0.0);
            assert!(!p.displaced);
        }
    }

    #[test]
    fn transparent_and_removed_cells_are_skipped() {
        let mut s = settings(false);
        s.remove_lightest_colour = true;
        let grid = BlockGrid::new(4, 1, vec![-1, 0, 1, 2]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let placements = layout_blocks(&grid, &s, canvas(), &mut rng);
        let indices: Vec<_> = placements.iter().map(|p| p.index).collect();
        assert_eq!(indices, [2, 3]);
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let mut s = settings(true);
        s.explosion.use_random = true;
        let grid = BlockGrid::new(10, 10, vec![0; 100]).unwrap();
        let a = layout_blocks(&grid, &s, canvas(), &mut StdRng::seed_from_u64(42));
        let b = layout_blocks(&grid, &s, canvas(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        // Jitter never pushes a block further than the deterministic offset.
        let c = layout_blocks(&grid, &settings(true), canvas(), &mut StdRng::seed_from_u64(0));
        for (r, d) in a.iter().zip(&c) {
            assert!((r.position.x - r.origin.x).abs() <= (d.position.x - d.origin.x).abs() + 1e-9);
        }
    }

    #[test]
    fn canvas_size_from_grid_or_fixed() {
        let mut s = settings(false);
        s.block_size = 7.5;
        let grid = BlockGrid::new(4, 3, vec![0; 12]).unwrap();
        assert_eq!(
            CanvasSize::for_grid(&grid, &s),
            CanvasSize {
                width: 30,
                height: 23
            }
        );
        let empty = BlockGrid::new(0, 0, vec![]).unwrap();
        assert_eq!(
            CanvasSize::for_grid(&empty, &s),
            CanvasSize {
                width: 1,
                height: 1
            }
        );
        s.canvas_size = Some((64, 48));
        assert_eq!(
            CanvasSize::for_grid(&grid, &s),
            CanvasSize {
                width: 64,
                height: 48
            }
        );
    }
}
