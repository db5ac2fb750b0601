/*!
Normals of vertices, edges and triangles.

The [`Status`](crate::Status) flags record which element kinds hold trusted
normals. Propagation fills in the others from whichever kinds are trusted,
with vertices taking precedence over edges, and edges over triangles.
*/

use glam::DVec3;

use crate::{
    element::{Handle, TH},
    mesh::Mesh,
};

impl Mesh {
    /// Unit normal of `t` computed from its corner positions, oriented by the
    /// winding the triangle was created with. Zero if the triangle is
    /// degenerate.
    pub fn calc_triangle_normal(&self, t: TH) -> DVec3 {
        let [a, b, c] = self.triangle_points(t);
        let n = (b - a).cross(c - a).normalize_or_zero();
        if self[t].flip { -n } else { n }
    }

    pub fn triangle_area(&self, t: TH) -> f64 {
        let [a, b, c] = self.triangle_points(t);
        0.5 * (b - a).cross(c - a).length()
    }

    /// Total area of all triangles.
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| self.triangle_area(t)).sum()
    }

    /// Compute all normals from the positions.
    ///
    /// Triangle normals come from the corner positions. Each edge takes the
    /// average of the triangles it borders, and each vertex the average of its
    /// edges. Edges that border no triangles take the average of their two
    /// vertices.
    pub fn calculate_normals(&mut self) {
        for i in 0..self.triangles.len() {
            let t: TH = (i as u32).into();
            self.triangles[i].n = self.calc_triangle_normal(t);
        }
        for v in self.vertices.iter_mut() {
            v.n = DVec3::ZERO;
        }
        for e in self.edges.iter_mut() {
            if e.triangle_count == 0 {
                continue;
            }
            e.n = e
                .triangles()
                .map(|t| self.triangles[t.index() as usize].n)
                .sum::<DVec3>()
                .normalize_or_zero();
            self.vertices[e.va.index() as usize].n += e.n;
            self.vertices[e.vb.index() as usize].n += e.n;
        }
        for v in self.vertices.iter_mut() {
            v.n = v.n.normalize_or_zero();
        }
        self.edge_normals_from_vertices(true);
        let status = &mut self.status;
        status.set_vertex_normals(true);
        status.set_edge_normals(true);
        status.set_triangle_normals(true);
    }

    /// Fill in the normals of the element kinds that are not flagged as
    /// trusted, from those that are. If none are trusted, everything is
    /// computed from the positions.
    pub fn propagate_normals(&mut self) {
        if !self.status.any_normals() {
            self.calculate_normals();
            return;
        }
        if self.status.vertex_normals() {
            if !self.status.edge_normals() {
                self.edge_normals_from_vertices(false);
                self.status.set_edge_normals(true);
            }
            if !self.status.triangle_normals() {
                self.triangle_normals_from_vertices();
                self.status.set_triangle_normals(true);
            }
        }
        if self.status.edge_normals() {
            if !self.status.vertex_normals() {
                self.vertex_normals_from_edges();
                self.status.set_vertex_normals(true);
            }
            if !self.status.triangle_normals() {
                self.triangle_normals_from_edges();
                self.status.set_triangle_normals(true);
            }
        }
        if self.status.triangle_normals() {
            if !self.status.vertex_normals() {
                self.vertex_normals_from_triangles();
                self.status.set_vertex_normals(true);
            }
            if !self.status.edge_normals() {
                self.edge_normals_from_triangles();
                self.status.set_edge_normals(true);
            }
        }
    }

    /// Distrust the normals of the chosen element kinds and propagate again.
    /// Use this after editing positions or normals directly.
    pub fn update_normals(&mut self, vertices: bool, edges: bool, triangles: bool) {
        if vertices {
            self.status.set_vertex_normals(false);
        }
        if edges {
            self.status.set_edge_normals(false);
        }
        if triangles {
            self.status.set_triangle_normals(false);
        }
        self.propagate_normals();
    }

    /// Reverse all stored normals. Positions and winding are unchanged.
    pub fn flip_normals(&mut self) {
        for v in self.vertices.iter_mut() {
            v.n = -v.n;
        }
        for e in self.edges.iter_mut() {
            e.n = -e.n;
        }
        for t in self.triangles.iter_mut() {
            t.n = -t.n;
        }
    }

    /// Average of the two vertex normals, for every edge or only for the edges
    /// that border no triangles.
    fn edge_normals_from_vertices(&mut self, only_free: bool) {
        for e in self.edges.iter_mut() {
            if only_free && e.triangle_count > 0 {
                continue;
            }
            e.n = (self.vertices[e.va.index() as usize].n + self.vertices[e.vb.index() as usize].n)
                .normalize_or_zero();
        }
    }

    fn triangle_normals_from_vertices(&mut self) {
        for t in self.triangles.iter_mut() {
            t.n = t
                .vertices()
                .iter()
                .map(|v| self.vertices[v.index() as usize].n)
                .sum::<DVec3>()
                .normalize_or_zero();
        }
    }

    fn vertex_normals_from_edges(&mut self) {
        for v in self.vertices.iter_mut() {
            v.n = DVec3::ZERO;
        }
        for e in self.edges.iter() {
            self.vertices[e.va.index() as usize].n += e.n;
            self.vertices[e.vb.index() as usize].n += e.n;
        }
        for v in self.vertices.iter_mut() {
            v.n = v.n.normalize_or_zero();
        }
    }

    fn triangle_normals_from_edges(&mut self) {
        for t in self.triangles.iter_mut() {
            t.n = t
                .edges()
                .iter()
                .map(|e| self.edges[e.index() as usize].n)
                .sum::<DVec3>()
                .normalize_or_zero();
        }
    }

    fn vertex_normals_from_triangles(&mut self) {
        for v in self.vertices.iter_mut() {
            v.n = DVec3::ZERO;
        }
        for t in self.triangles.iter() {
            for v in t.vertices() {
                self.vertices[v.index() as usize].n += t.n;
            }
        }
        for v in self.vertices.iter_mut() {
            v.n = v.n.normalize_or_zero();
        }
    }

    /// Edges bordering triangles average them. The rest take their vertices,
    /// which must already be trusted.
    fn edge_normals_from_triangles(&mut self) {
        for e in self.edges.iter_mut() {
            if e.triangle_count == 0 {
                continue;
            }
            e.n = e
                .triangles()
                .map(|t| self.triangles[t.index() as usize].n)
                .sum::<DVec3>()
                .normalize_or_zero();
        }
        self.edge_normals_from_vertices(true);
    }
}

#[cfg(test)]
mod test {
    use glam::{DVec3, dvec3};

    use crate::{
        element::{Edge, Vertex},
        macros::{assert_f64_eq, assert_vec_eq},
        mesh::Mesh,
    };

    /// Two triangles folded along the x axis, both facing up and outwards.
    fn fold() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertices(&[
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 1.0),
            dvec3(0.0, -1.0, 1.0),
        ]);
        mesh.add_triangle(0.into(), 1.into(), 2.into());
        mesh.add_triangle(1.into(), 0.into(), 3.into());
        mesh.finish().expect("Cannot finish");
        mesh
    }

    #[test]
    fn t_calculate_normals() {
        let mesh = fold();
        assert!(mesh.status().all_normals());
        let up = dvec3(0.0, 0.0, 1.0);
        for t in mesh.triangles() {
            assert_vec_eq!(mesh[t].n, mesh.calc_triangle_normal(t));
            assert!(mesh[t].n.dot(up) > 0.0);
        }
        let shared = mesh
            .edges()
            .find(|e| mesh[*e].triangle_count == 2)
            .expect("The fold must have a shared edge");
        assert_vec_eq!(mesh[shared].n, up);
        for v in mesh.vertices() {
            assert_f64_eq!(mesh[v].n.length(), 1.0, 1e-12);
        }
    }

    #[test]
    fn t_free_edge_takes_vertex_normals() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vertex::new(DVec3::ZERO));
        let b = mesh.add_vertex(Vertex::new(DVec3::X));
        let c = mesh.add_vertex(Vertex::new(DVec3::Y));
        let d = mesh.add_vertex(Vertex::new(dvec3(5.0, 5.0, 0.0)));
        mesh.add_triangle(a, b, c);
        let free = mesh.add_edge(Edge::new(b, d));
        mesh.calculate_normals();
        // Vertex d has no triangles, so the free edge only sees vertex b.
        assert_vec_eq!(mesh[free].n, DVec3::Z);
        assert_eq!(mesh[d].n, DVec3::ZERO);
    }

    #[test]
    fn t_propagate_from_each_source() {
        let reference = fold();
        for (v, e, t) in [
            (true, false, false),
            (false, true, false),
            (false, false, true),
        ] {
            let mut mesh = reference.clone();
            // Scramble what is not trusted.
            if !v {
                mesh.vertices.iter_mut().for_each(|x| x.n = DVec3::X);
            }
            if !e {
                mesh.edges.iter_mut().for_each(|x| x.n = DVec3::X);
            }
            if !t {
                mesh.triangles.iter_mut().for_each(|x| x.n = DVec3::X);
            }
            let status = mesh.status_mut();
            status.set_vertex_normals(v);
            status.set_edge_normals(e);
            status.set_triangle_normals(t);
            mesh.propagate_normals();
            assert!(mesh.status().all_normals());
            for x in mesh.vertex_slice().iter().map(|x| x.n)
                .chain(mesh.edge_slice().iter().map(|x| x.n))
                .chain(mesh.triangle_slice().iter().map(|x| x.n))
            {
                assert!(x.z > 0.0, "Normal {:?} must point up", x);
                assert_f64_eq!(x.length(), 1.0, 1e-12);
            }
        }
    }

    #[test]
    fn t_update_normals() {
        let mut mesh = fold();
        // Half turn around the x axis.
        for v in mesh.vertices() {
            let p = &mut mesh[v].pos;
            p.y = -p.y;
            p.z = -p.z;
        }
        mesh.update_normals(true, true, true);
        for t in mesh.triangles() {
            assert!(mesh[t].n.z < 0.0);
        }
        for v in mesh.vertices() {
            assert!(mesh[v].n.z < 0.0);
        }
    }

    #[test]
    fn t_flip_normals() {
        let mut mesh = fold();
        let before = mesh.clone();
        mesh.flip_normals();
        for (a, b) in mesh.triangle_slice().iter().zip(before.triangle_slice()) {
            assert_eq!(a.n, -b.n);
            assert_eq!(a.vertices(), b.vertices());
            assert_eq!(a.flip, b.flip);
        }
        for (a, b) in mesh.vertex_slice().iter().zip(before.vertex_slice()) {
            assert_eq!(a.n, -b.n);
        }
    }

    #[test]
    fn t_area() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(&[
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(2.0, 3.0, 0.0),
            dvec3(0.0, 3.0, 0.0),
        ]);
        mesh.add_quad(0.into(), 1.into(), 2.into(), 3.into());
        assert_f64_eq!(mesh.area(), 6.0, 1e-12);
    }
}
