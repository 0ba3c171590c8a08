//! Edge path geometry.
//!
//! Pure functions from resolved endpoint centers/radii to either a straight
//! two-segment polyline (the explicit midpoint carries mid-line markers) or a
//! circular arc clipped to the node boundaries. No simulation state is read
//! or written here; the engine calls these after every tick.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Resolved endpoints of one edge, in simulation coordinates.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEnds {
    pub source: Point,
    pub target: Point,
    pub source_radius: f64,
    pub target_radius: f64,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathGeometry {
    /// Straight path with an explicit midpoint vertex.
    Polyline { start: Point, mid: Point, end: Point },
    /// Circular arc segment.
    Arc {
        start: Point,
        end: Point,
        radius: f64,
        large_arc: bool,
        sweep: bool,
    },
}

impl PathGeometry {
    /// Serializes to SVG path data for the rendering collaborator.
    pub fn to_svg_path(&self) -> String {
        match self {
            PathGeometry::Polyline { start, mid, end } => format!(
                "M{},{}L{},{}L{},{}",
                start.x, start.y, mid.x, mid.y, end.x, end.y
            ),
            PathGeometry::Arc {
                start,
                end,
                radius,
                large_arc,
                sweep,
            } => format!(
                "M {} {} A {} {} 0 {} {} {} {}",
                start.x,
                start.y,
                radius,
                radius,
                u8::from(*large_arc),
                u8::from(*sweep),
                end.x,
                end.y
            ),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        match self {
            PathGeometry::Polyline { start, end, .. } => start == end,
            PathGeometry::Arc { start, end, .. } => start == end,
        }
    }
}

/// Straight source-to-target path through an explicit midpoint. With
/// `exclude_radius` the endpoints are pulled onto the node boundaries along
/// the connecting direction.
pub fn line_path(ends: &EdgeEnds, exclude_radius: bool) -> PathGeometry {
    let dx = ends.target.x - ends.source.x;
    let dy = ends.target.y - ends.source.y;
    let gamma = dy.atan2(dx);

    let (start, end) = if exclude_radius {
        (
            Point::new(
                ends.source.x + gamma.cos() * ends.source_radius,
                ends.source.y + gamma.sin() * ends.source_radius,
            ),
            Point::new(
                ends.target.x - gamma.cos() * ends.target_radius,
                ends.target.y - gamma.sin() * ends.target_radius,
            ),
        )
    } else {
        (ends.source, ends.target)
    };

    let mid = Point::new(
        (end.x - start.x) / 2.0 + start.x,
        (end.y - start.y) / 2.0 + start.y,
    );
    PathGeometry::Polyline { start, mid, end }
}

/// Circular arc whose radius is 0.75x the endpoint distance, clipped to the
/// node boundaries (target side additionally padded by the stroke width).
///
/// Coincident endpoints yield a zero-length polyline instead of dividing by
/// zero.
pub fn arc_path(ends: &EdgeEnds) -> PathGeometry {
    let dx = ends.target.x - ends.source.x;
    let dy = ends.target.y - ends.source.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f64::EPSILON {
        return PathGeometry::Polyline {
            start: ends.source,
            mid: ends.source,
            end: ends.source,
        };
    }

    let radius = dist * 0.75;
    let Some((center, _)) = find_centers(radius, ends.source, ends.target) else {
        // Unreachable with the 0.75 factor, kept as a guard against a future
        // radius rule change.
        return line_path(ends, true);
    };

    let ang1 = angle_about(center, ends.source);
    let ang2 = angle_about(center, ends.target);
    let start = polar_to_cartesian(center, radius, ang1, ends.source_radius);
    let end = polar_to_cartesian(
        center,
        radius,
        ang2,
        ends.target_radius + ends.stroke_width + 5.0 * ends.stroke_width * 0.8,
    );

    PathGeometry::Arc {
        start,
        end,
        radius,
        large_arc: ang2 - ang1 > 180.0,
        // The first of the two circle centers is chosen consistently; the
        // matching sweep direction is fixed with it.
        sweep: false,
    }
}

/// Centers of the two circles of radius `r` through `p1` and `p2`, or `None`
/// when the points are farther apart than the diameter.
fn find_centers(r: f64, p1: Point, p2: Point) -> Option<(Point, Point)> {
    let pm = Point::new(0.5 * (p1.x + p2.x), 0.5 * (p1.y + p2.y));
    let mut perp_x = -(p2.y - p1.y);
    let mut perp_y = p2.x - p1.x;
    let norm = (perp_x * perp_x + perp_y * perp_y).sqrt();
    perp_x /= norm;
    perp_y /= norm;

    let half = ((pm.x - p1.x).powi(2) + (pm.y - p1.y).powi(2)).sqrt();
    let sin = half / r;
    if !(-1.0..=1.0).contains(&sin) {
        return None;
    }
    let cos = (1.0 - sin * sin).sqrt();
    let d = r * cos;
    Some((
        Point::new(pm.x + perp_x * d, pm.y + perp_y * d),
        Point::new(pm.x - perp_x * d, pm.y - perp_y * d),
    ))
}

/// Angle of `p` about `center` in degrees, rotated so 0deg points up (the SVG
/// arc convention used by the serialized paths).
fn angle_about(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees() + 90.0
}

fn polar_to_cartesian(center: Point, radius: f64, angle_deg: f64, offset: f64) -> Point {
    let a = (angle_deg - 90.0).to_radians();
    Point::new(
        center.x + (radius - offset) * a.cos(),
        center.y + (radius - offset) * a.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::{EdgeEnds, PathGeometry, Point, arc_path, line_path};

    fn ends(sx: f64, sy: f64, tx: f64, ty: f64) -> EdgeEnds {
        EdgeEnds {
            source: Point::new(sx, sy),
            target: Point::new(tx, ty),
            source_radius: 5.0,
            target_radius: 5.0,
            stroke_width: 1.0,
        }
    }

    #[test]
    fn line_midpoint_bisects_the_segment() {
        let p = line_path(&ends(0.0, 0.0, 10.0, 20.0), false);
        let PathGeometry::Polyline { start, mid, end } = p else {
            panic!("expected polyline");
        };
        assert_eq!(start, Point::new(0.0, 0.0));
        assert_eq!(end, Point::new(10.0, 20.0));
        assert!((mid.x - 5.0).abs() < 1e-12);
        assert!((mid.y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn line_exclude_radius_starts_on_the_node_boundary() {
        let p = line_path(&ends(0.0, 0.0, 100.0, 0.0), true);
        let PathGeometry::Polyline { start, end, .. } = p else {
            panic!("expected polyline");
        };
        assert!((start.x - 5.0).abs() < 1e-12);
        assert_eq!(start.y, 0.0);
        assert!((end.x - 95.0).abs() < 1e-12);
    }

    #[test]
    fn arc_endpoints_are_finite_and_offset() {
        let p = arc_path(&ends(0.0, 0.0, 100.0, 0.0));
        let PathGeometry::Arc {
            start,
            end,
            radius,
            ..
        } = p
        else {
            panic!("expected arc");
        };
        assert!((radius - 75.0).abs() < 1e-12);
        for v in [start.x, start.y, end.x, end.y] {
            assert!(v.is_finite());
        }
        // Clipped ends sit strictly inside the chord endpoints.
        assert!(start.x > 0.0);
        assert!(end.x < 100.0);
    }

    #[test]
    fn coincident_endpoints_degenerate_without_nan() {
        let p = arc_path(&ends(7.0, -3.0, 7.0, -3.0));
        assert!(p.is_degenerate());
        let svg = p.to_svg_path();
        assert!(!svg.contains("NaN"), "degenerate path leaked NaN: {svg}");
    }

    #[test]
    fn svg_serialization_shapes() {
        let line = line_path(&ends(0.0, 0.0, 2.0, 0.0), false);
        assert_eq!(line.to_svg_path(), "M0,0L1,0L2,0");
        let arc = arc_path(&ends(0.0, 0.0, 100.0, 0.0));
        assert!(arc.to_svg_path().starts_with("M "));
        assert!(arc.to_svg_path().contains(" A 75 75 0 "));
    }
}
