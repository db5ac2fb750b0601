use glam::{DMat3, DMat4, DVec3};

use crate::mesh::Mesh;

impl Mesh {
    /// Apply an affine transform to all positions and all stored normals.
    ///
    /// Normals go through the inverse transpose of the linear part and are
    /// renormalized. A transform that mirrors the mesh reverses the winding
    /// of every triangle, so that the transformed normals still agree with
    /// it.
    pub fn transform(&mut self, mat: DMat4) {
        let linear = DMat3::from_mat4(mat);
        let det = linear.determinant();
        let normal_mat = if det.abs() > f64::EPSILON {
            linear.inverse().transpose()
        } else {
            linear
        };
        let normal = |n: DVec3| (normal_mat * n).normalize_or_zero();
        for v in self.vertices.iter_mut() {
            v.pos = mat.transform_point3(v.pos);
            v.n = normal(v.n);
        }
        for e in self.edges.iter_mut() {
            e.n = normal(e.n);
        }
        for t in self.triangles.iter_mut() {
            t.n = normal(t.n);
            t.t = (linear * t.t).normalize_or_zero();
            t.b = (linear * t.b).normalize_or_zero();
        }
        if det < 0.0 {
            self.invert_winding();
        }
    }

    /// Swap the inside and the outside: reverse the winding of every triangle
    /// and every normal.
    pub fn flip_inside_outside(&mut self) {
        self.invert_winding();
        self.flip_normals();
    }

    /// Toggle the orientation bit of every triangle and edge. Vertex order is
    /// unchanged, so the mesh stays canonical.
    fn invert_winding(&mut self) {
        for e in self.edges.iter_mut() {
            e.flip = !e.flip;
        }
        for t in self.triangles.iter_mut() {
            t.flip = !t.flip;
        }
    }
}
