use arrayvec::ArrayVec;
use glam::DVec3;

use crate::{
    element::{Handle, TH},
    error::Error,
    mesh::Mesh,
    polygon::Polygon3,
};

impl Mesh {
    /// Intersect the mesh with the plane of points `p` where
    /// `p.dot(normal) == distance`.
    ///
    /// Every triangle crossing the plane contributes one edge between the
    /// points where the plane crosses two of its sides. Each point takes the
    /// normal of the crossed edge, or of the triangle if the edge is sharp.
    /// Edges are directed so that the outlines turn counter clockwise around
    /// `normal` when seen from outside the mesh. The result is joined and
    /// sorted into chains.
    ///
    /// Triangles that lie entirely within epsilon of the plane are skipped.
    /// The mesh must pass the self check.
    pub fn intersect_plane(&self, normal: DVec3, distance: f64) -> Result<Polygon3, Error> {
        if !self.passed_self_check(false, 10) {
            return Err(Error::SelfCheckFailed);
        }
        let eps = self.epsilon;
        let dist: Vec<f64> = self
            .vertices
            .iter()
            .map(|v| v.pos.dot(normal) - distance)
            .collect();
        let mut poly = Polygon3::with_epsilon(eps);
        for (i, t) in self.triangles.iter().enumerate() {
            let d = t.vertices().map(|v| dist[v.index() as usize]);
            if d.iter().all(|x| *x > eps) || d.iter().all(|x| *x < -eps) {
                continue;
            }
            let mut crossings: ArrayVec<(DVec3, DVec3), 3> = ArrayVec::new();
            for (side, e) in t.edges().into_iter().enumerate() {
                let (a, b) = t.side_vertices(side);
                let (da, db) = (dist[a.index() as usize], dist[b.index() as usize]);
                if (da < 0.0) == (db < 0.0) {
                    continue;
                }
                let s = da / (da - db);
                let p = self.point(a).lerp(self.point(b), s);
                let edge = &self.edges[e.index() as usize];
                let n = if edge.sharp { t.n } else { edge.n };
                crossings.push((p, n));
            }
            let [(mut p, mut np), (mut q, mut nq)] = match crossings.as_slice() {
                &[first, second] => [first, second],
                _ => continue,
            };
            // Inside of the mesh on the left, seen from where the plane normal
            // points.
            let facing = self.calc_triangle_normal(TH::from(i as u32));
            if (q - p).dot(normal.cross(facing)) < 0.0 {
                std::mem::swap(&mut p, &mut q);
                std::mem::swap(&mut np, &mut nq);
            }
            let va = poly.add_vertex(p, np);
            let vb = poly.add_vertex(q, nq);
            poly.add_edge(va, vb);
        }
        let nsegments = poly.num_edges();
        poly.join();
        let nchains = poly.sort_loop();
        log::debug!(
            "Plane crosses {} triangles, giving {} vertices in {} chains",
            nsegments,
            poly.num_vertices(),
            nchains
        );
        Ok(poly)
    }
}

#[cfg(test)]
mod test {
    use glam::{DVec3, dvec3};

    use crate::{
        error::Error,
        macros::{assert_f64_eq, assert_vec_eq},
        mesh::Mesh,
    };

    #[test]
    fn t_cube_cross_section() {
        let mesh = Mesh::unit_box().expect("Cannot create box");
        let mut poly = mesh
            .intersect_plane(DVec3::Z, 0.5)
            .expect("Cannot intersect");
        // Each side face is split by a diagonal, so after join the outline has
        // the four corners and four points where it crosses the diagonals.
        // Those are straight through points, and simplify leaves the corners.
        assert_eq!(poly.num_vertices(), 8);
        assert_eq!(poly.num_edges(), 8);
        assert!(poly.is_closed());
        assert_eq!(poly.chains(), vec![0..8]);
        assert_vec_eq!(poly.vector_area(), DVec3::Z, 1e-12);
        for v in poly.vertices() {
            assert_f64_eq!(v.pos.z, 0.5, 1e-12);
        }
        assert_eq!(poly.simplify(), 4);
        assert_eq!(poly.num_vertices(), 4);
        assert_f64_eq!(poly.area(), 1.0, 1e-12);
        assert_f64_eq!(poly.length(), 4.0, 1e-12);
    }

    #[test]
    fn t_winding_follows_orientation() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        mesh.flip_inside_outside();
        let poly = mesh
            .intersect_plane(DVec3::Z, 0.25)
            .expect("Cannot intersect");
        assert_vec_eq!(poly.vector_area(), -DVec3::Z, 1e-12);
    }

    #[test]
    fn t_miss() {
        let mesh = Mesh::unit_box().expect("Cannot create box");
        let poly = mesh
            .intersect_plane(DVec3::X, 3.0)
            .expect("Cannot intersect");
        assert!(poly.is_empty());
        assert_eq!(poly.num_vertices(), 0);
    }

    #[test]
    fn t_sphere_cross_section() {
        let mesh = Mesh::uv_sphere(dvec3(0.0, 0.0, 1.0), 2.0, 32, 17).expect("Cannot create sphere");
        let poly = mesh
            .intersect_plane(DVec3::Y, 0.01)
            .expect("Cannot intersect");
        assert!(poly.is_closed());
        assert_eq!(poly.chains().len(), 1);
        let area = poly.vector_area();
        assert!(area.y > 0.0);
        // Close to the area of the disk, from below.
        let disk = std::f64::consts::PI * (4.0 - 0.01 * 0.01);
        assert!(area.length() < disk && area.length() > 0.95 * disk);
        for v in poly.vertices() {
            assert_f64_eq!(v.n.y, 0.0, 0.2);
        }
    }

    #[test]
    fn t_requires_consistent_mesh() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        mesh.triangles[0].ea = 100.into();
        assert_eq!(
            mesh.intersect_plane(DVec3::Z, 0.5).err(),
            Some(Error::SelfCheckFailed)
        );
    }
}
