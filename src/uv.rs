use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};

use crate::{
    element::{Handle, TH},
    mesh::Mesh,
};

/// Below this magnitude the texture mapping of a triangle is considered flat.
const FLAT_UV_DETERMINANT: f64 = 1e-12;

/// Angle around `axis` as a fraction of a full turn, in `(-0.5, 0.5]`.
fn turn_fraction(d: DVec3, e1: DVec3, e2: DVec3) -> f64 {
    d.dot(e2).atan2(d.dot(e1)) / TAU
}

/// Move the corners of a triangle that straddles the seam of a wrapped
/// mapping onto the same side of it.
fn unwrap_seam(uv: &mut [DVec2; 3]) {
    let high = uv.iter().any(|c| c.x > 0.25);
    let low = uv.iter().any(|c| c.x < -0.25);
    if high && low {
        for c in uv.iter_mut().filter(|c| c.x < -0.25) {
            c.x += 1.0;
        }
    }
}

impl Mesh {
    /// Assign texture coordinates to every triangle corner with `f`, which maps
    /// a position to a texture coordinate. When `wrapped` is set, corners on
    /// opposite sides of the seam at `u = +-0.5` are brought together.
    fn assign_uv<F>(&mut self, wrapped: bool, f: F)
    where
        F: Fn(DVec3) -> DVec2,
    {
        for v in self.vertices.iter_mut() {
            v.uv = f(v.pos);
        }
        for t in self.triangles.iter_mut() {
            let mut uv = t.vertices().map(|v| f(self.vertices[v.index() as usize].pos));
            if wrapped {
                unwrap_seam(&mut uv);
            }
            t.uv = uv;
        }
        self.calculate_uv_coordinate_systems();
    }

    /// Project every triangle onto the coordinate plane most perpendicular to
    /// its normal.
    pub fn calculate_uv_from_box(&mut self, scale: f64) {
        for i in 0..self.triangles.len() {
            let n = self.calc_triangle_normal((i as u32).into()).abs();
            let t = &mut self.triangles[i];
            let project = |p: DVec3| -> DVec2 {
                if n.x >= n.y && n.x >= n.z {
                    DVec2::new(p.y, p.z)
                } else if n.y >= n.z {
                    DVec2::new(p.x, p.z)
                } else {
                    DVec2::new(p.x, p.y)
                }
            };
            t.uv = t
                .vertices()
                .map(|v| project(self.vertices[v.index() as usize].pos) * scale);
        }
        self.calculate_uv_coordinate_systems();
    }

    /// Project onto the plane perpendicular to `axis`.
    pub fn calculate_uv_from_axis(&mut self, axis: DVec3, scale: f64) {
        let (e1, e2) = axis.normalize_or(DVec3::Z).any_orthonormal_pair();
        self.assign_uv(false, |p| DVec2::new(p.dot(e1), p.dot(e2)) * scale);
    }

    /// Wrap around the cylinder through `origin` along `axis`. `u` is the angle
    /// as a fraction of a full turn and `v` the scaled height along the axis.
    pub fn calculate_uv_from_cylinder(&mut self, origin: DVec3, axis: DVec3, scale: f64) {
        let a = axis.normalize_or(DVec3::Z);
        let (e1, e2) = a.any_orthonormal_pair();
        self.assign_uv(true, |p| {
            let d = p - origin;
            DVec2::new(turn_fraction(d, e1, e2), d.dot(a) * scale)
        });
    }

    /// Wrap around the sphere at `center` with its pole along `axis`. `u` is
    /// the longitude as a fraction of a full turn and `v` the polar angle as a
    /// fraction of a half turn.
    pub fn calculate_uv_from_sphere(&mut self, center: DVec3, axis: DVec3) {
        let a = axis.normalize_or(DVec3::Z);
        let (e1, e2) = a.any_orthonormal_pair();
        self.assign_uv(true, |p| {
            let d = p - center;
            let polar = d.normalize_or_zero().dot(a).clamp(-1.0, 1.0).acos();
            DVec2::new(turn_fraction(d, e1, e2), polar / PI)
        });
    }

    /// Compute the tangent and bitangent of every triangle from its texture
    /// coordinates. Triangles with a flat mapping get zero vectors. The texture
    /// flag is set if at least one triangle has a proper mapping.
    pub fn calculate_uv_coordinate_systems(&mut self) {
        let mut textured = false;
        for i in 0..self.triangles.len() {
            let [p0, p1, p2] = self.triangle_points(TH::from(i as u32));
            let t = &mut self.triangles[i];
            let (e1, e2) = (p1 - p0, p2 - p0);
            let (d1, d2) = (t.uv[1] - t.uv[0], t.uv[2] - t.uv[0]);
            let det = d1.perp_dot(d2);
            if det.abs() < FLAT_UV_DETERMINANT {
                t.t = DVec3::ZERO;
                t.b = DVec3::ZERO;
                continue;
            }
            textured = true;
            let r = 1.0 / det;
            t.t = ((e1 * d2.y - e2 * d1.y) * r).normalize_or_zero();
            t.b = ((e2 * d1.x - e1 * d2.x) * r).normalize_or_zero();
        }
        self.status.set_texture(textured);
    }
}
