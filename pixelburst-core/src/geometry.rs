//! Small plane-geometry helpers used by the explosion layout.

/// A point in output-pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }
}

/// Euclidean distance between `(x1, y1)` and `(x2, y2)`.
#[inline]
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Angle (radians) of the right triangle with the given opposite and adjacent
/// sides, taking the signs into account so the full circle is covered.
#[inline]
pub fn angle_from_opposite_adjacent(opposite: f64, adjacent: f64) -> f64 {
    opposite.atan2(adjacent)
}

/// Adjacent side for a hypotenuse at `angle` radians.
#[inline]
pub fn adjacent_from_hypotenuse(hypotenuse: f64, angle: f64) -> f64 {
    angle.cos() * hypotenuse
}

/// Opposite side for a hypotenuse at `angle` radians.
#[inline]
pub fn opposite_from_hypotenuse(hypotenuse: f64, angle: f64) -> f64 {
    angle.sin() * hypotenuse
}

/// Project `pt` onto the circle of `radius` around `center`, along the ray
/// from the centre through the point.
///
/// A point sitting exactly on the centre has no direction; it projects onto
/// the circle's rightmost point.
pub fn point_on_circle(center: Point, radius: f64, pt: Point) -> Point {
    let adjacent = pt.x - center.x;
    let opposite = pt.y - center.y;
    let angle = angle_from_opposite_adjacent(opposite, adjacent);
    Point {
        x: center.x + adjacent_from_hypotenuse(radius, angle),
        y: center.y + opposite_from_hypotenuse(radius, angle),
    }
}

/// Absolute per-axis distances between two points, rounded to three decimals.
///
/// The rounding keeps displacement fractions stable against float noise in
/// the trigonometric projection.
pub fn axis_distances(a: Point, b: Point) -> (f64, f64) {
    (round3((a.x - b.x).abs()), round3((a.y - b.y).abs()))
}

#[inline]
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn distance_is_pythagorean() {
        assert!((distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < EPSILON);
        assert!((Point::new(1.0, 1.0).distance_to(Point::new(1.0, 1.0))).abs() < EPSILON);
    }

    #[test]
    fn trig_decomposition_recovers_sides() {
        let angle = angle_from_opposite_adjacent(4.0, 3.0);
        assert!((adjacent_from_hypotenuse(5.0, angle) - 3.0).abs() < EPSILON);
        assert!((opposite_from_hypotenuse(5.0, angle) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn projection_lands_on_circle_in_every_quadrant() {
        let c = Point::new(50.0, 50.0);
        for &(x, y) in &[(90.0, 80.0), (10.0, 80.0), (10.0, 20.0), (90.0, 20.0)] {
            let p = point_on_circle(c, 10.0, Point::new(x, y));
            assert!((p.distance_to(c) - 10.0).abs() < 1e-9);
            // Same side of the centre as the source point on both axes.
            assert_eq!((p.x - c.x).signum(), (x - c.x).signum());
            assert_eq!((p.y - c.y).signum(), (y - c.y).signum());
        }
    }

    #[test]
    fn projection_on_vertical_axis() {
        let c = Point::new(0.0, 0.0);
        let p = point_on_circle(c, 2.0, Point::new(0.0, -7.0));
        assert!(p.x.abs() < EPSILON);
        assert!((p.y + 2.0).abs() < EPSILON);
    }

    #[test]
    fn axis_distances_round_to_thousandths() {
        let (dx, dy) = axis_distances(Point::new(0.0, 0.0), Point::new(1.23456, -2.0));
        assert_eq!(dx, 1.235);
        assert_eq!(dy, 2.0);
    }
}
