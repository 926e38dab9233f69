//! Point containment helpers for zone quads.

use glam::Vec2;

/// Zero counts as positive so that points on a line agree with either side.
fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Reports whether `p0` and `p1` lie on the same side of the line `l0 -> l1`.
fn same_side(l0: Vec2, l1: Vec2, p0: Vec2, p1: Vec2) -> bool {
    let l0l1 = l1 - l0;
    let l0p0 = p0 - l0;
    let l0p1 = p1 - l0;

    sign(l0l1.x * l0p0.y - l0l1.y * l0p0.x) == sign(l0l1.x * l0p1.y - l0l1.y * l0p1.x)
}

/// Barycentric weights of `p` along the `t0 -> t1` and `t0 -> t2` edges.
fn barycentric(t0: Vec2, t1: Vec2, t2: Vec2, p: Vec2) -> (f32, f32) {
    let e0 = t1 - t0;
    let e1 = t2 - t0;
    let e2 = p - t0;

    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);
    let d20 = e2.dot(e0);
    let d21 = e2.dot(e1);
    let denom = d00 * d11 - d01 * d01;

    (
        (d11 * d20 - d01 * d21) / denom,
        (d00 * d21 - d01 * d20) / denom,
    )
}

/// The edge opposite `t0` is exclusive, so a point on a shared diagonal
/// belongs to exactly one of the two triangles of a quad.
fn inside_triangle(t0: Vec2, t1: Vec2, t2: Vec2, p: Vec2) -> bool {
    let (u, v) = barycentric(t0, t1, t2, p);
    u >= 0.0 && v >= 0.0 && u + v < 1.0
}

/// Tests `p` against the quad `q0 q1 q2 q3`, split along the `q1 - q2` diagonal.
///
/// Corners follow the map layout: top-left, top-right, bottom-left,
/// bottom-right.
pub(crate) fn inside_quad(corners: [Vec2; 4], p: Vec2) -> bool {
    let [q0, q1, q2, q3] = corners;
    if same_side(q1, q2, p, q0) {
        inside_triangle(q0, q1, q2, p)
    } else {
        inside_triangle(q1, q2, q3, p)
    }
}

/// Rotates `point` about `center` by `angle` radians.
pub(crate) fn rotate_about(center: Vec2, point: Vec2, angle: f32) -> Vec2 {
    let x = point.x - center.x;
    let y = point.y - center.y;
    let (sin, cos) = (angle.sin(), angle.cos());
    Vec2::new(x * cos - y * sin + center.x, x * sin + y * cos + center.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [Vec2; 4] = [
        Vec2::new(0.0, 0.0),
        Vec2::new(64.0, 0.0),
        Vec2::new(0.0, 64.0),
        Vec2::new(64.0, 64.0),
    ];

    #[test]
    fn inside_quad_covers_both_triangles() {
        assert!(inside_quad(SQUARE, Vec2::new(16.0, 16.0)));
        assert!(inside_quad(SQUARE, Vec2::new(48.0, 48.0)));
        assert!(inside_quad(SQUARE, Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn inside_quad_rejects_outside_points() {
        assert!(!inside_quad(SQUARE, Vec2::new(80.0, 16.0)));
        assert!(!inside_quad(SQUARE, Vec2::new(16.0, -1.0)));
        assert!(!inside_quad(SQUARE, Vec2::new(-0.5, 32.0)));
    }

    #[test]
    fn points_on_split_diagonal_are_routed_to_first_triangle() {
        let on_diagonal = Vec2::new(32.0, 32.0);
        assert!(!inside_triangle(SQUARE[0], SQUARE[1], SQUARE[2], on_diagonal));
        assert!(inside_triangle(SQUARE[1], SQUARE[2], SQUARE[3], on_diagonal));
        // The same-side test counts the diagonal as q0's side, whose triangle
        // excludes it.
        assert!(!inside_quad(SQUARE, on_diagonal));
    }

    #[test]
    fn degenerate_quad_contains_nothing() {
        let flat = [Vec2::ZERO; 4];
        assert!(!inside_quad(flat, Vec2::ZERO));
    }

    #[test]
    fn rotate_about_quarter_turn() {
        let rotated = rotate_about(
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            std::f32::consts::FRAC_PI_2,
        );
        assert!((rotated - Vec2::new(10.0, 20.0)).length() < 1e-4);
    }
}
