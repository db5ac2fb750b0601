use glam::{DVec2, DVec3, Vec4};

use crate::{
    element::{EH, Edge, Handle, TH, Triangle, VH, Vertex, WHITE},
    error::Error,
    mesh::Mesh,
};

/// Attributes applied to the elements created by a single insertion.
///
/// When `normal` is `None` the triangle normal is computed from the positions.
/// A given normal marks triangle normals as trusted, so [`Mesh::finish`] keeps
/// it and derives the vertex and edge normals from it.
/// When `uv` is `None` the texture coordinates of each corner are copied from
/// its vertex. For quads, all four corners are given and each of the two
/// triangles takes its own corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AddContext {
    pub normal: Option<DVec3>,
    pub color: Option<Vec4>,
    pub uv: Option<[DVec2; 4]>,
}

impl AddContext {
    pub fn with_normal(mut self, n: DVec3) -> Self {
        self.normal = Some(n);
        self
    }

    pub fn with_color(mut self, c: Vec4) -> Self {
        self.color = Some(c);
        self
    }

    pub fn with_uv(mut self, uv: [DVec2; 4]) -> Self {
        self.uv = Some(uv);
        self
    }
}

impl Mesh {
    /// New vertices and edges carry no trusted normal. Existing triangle
    /// normals stay valid.
    fn touch(&mut self) {
        self.status.set_finished(false);
        self.status.set_vertex_normals(false);
        self.status.set_edge_normals(false);
    }

    pub fn add_vertex(&mut self, v: Vertex) -> VH {
        self.touch();
        let vi = self.vertices.len() as u32;
        self.vertices.push(v);
        vi.into()
    }

    /// Add a vertex copied from index `source` of another mesh, and record the
    /// correspondence in the vertex map.
    pub fn add_vertex_mapped(&mut self, v: Vertex, source: usize) -> VH {
        let vi = self.add_vertex(v);
        self.maps.vmap.set(source, vi);
        vi
    }

    /// Add several vertices, returning the range of their indices.
    pub fn add_vertices(&mut self, positions: &[DVec3]) -> std::ops::Range<u32> {
        let start = self.vertices.len() as u32;
        self.vertices.reserve(positions.len());
        for &p in positions {
            self.add_vertex(Vertex::new(p));
        }
        start..(self.vertices.len() as u32)
    }

    pub fn add_edge(&mut self, e: Edge) -> EH {
        self.touch();
        let ei = self.edges.len() as u32;
        self.edges.push(e);
        ei.into()
    }

    /// Add an edge copied from index `source` of another mesh, and record the
    /// correspondence in the edge map.
    pub fn add_edge_mapped(&mut self, e: Edge, source: usize) -> EH {
        let ei = self.add_edge(e);
        self.maps.emap.set(source, ei);
        ei
    }

    /// Add a triangle record as is. Its references are not checked or created.
    pub fn add_triangle_record(&mut self, t: Triangle) -> TH {
        self.touch();
        self.status.set_triangle_normals(false);
        let ti = self.triangles.len() as u32;
        self.triangles.push(t);
        ti.into()
    }

    /// Add a triangle record copied from index `source` of another mesh, and
    /// record the correspondence in the triangle map.
    pub fn add_triangle_mapped(&mut self, t: Triangle, source: usize) -> TH {
        let ti = self.add_triangle_record(t);
        self.maps.tmap.set(source, ti);
        ti
    }

    pub fn add_triangle(&mut self, a: VH, b: VH, c: VH) -> TH {
        self.add_triangle_with(a, b, c, &AddContext::default())
    }

    /// Add a triangle with the winding `a -> b -> c`, and the three edges along
    /// its sides. The vertices must already exist.
    pub fn add_triangle_with(&mut self, a: VH, b: VH, c: VH, ctx: &AddContext) -> TH {
        let uv = ctx.uv.map(|uv| [uv[0], uv[1], uv[2]]);
        self.push_triangle([a, b, c], uv, ctx)
    }

    pub fn add_quad(&mut self, a: VH, b: VH, c: VH, d: VH) -> [TH; 2] {
        self.add_quad_with(a, b, c, d, &AddContext::default())
    }

    /// Add the quad `a -> b -> c -> d` as the two triangles `(a, b, c)` and
    /// `(a, c, d)` sharing the diagonal `(a, c)`.
    pub fn add_quad_with(&mut self, a: VH, b: VH, c: VH, d: VH, ctx: &AddContext) -> [TH; 2] {
        let (uv0, uv1) = match ctx.uv {
            Some(uv) => (Some([uv[0], uv[1], uv[2]]), Some([uv[0], uv[2], uv[3]])),
            None => (None, None),
        };
        [
            self.push_triangle([a, b, c], uv0, ctx),
            self.push_triangle([a, c, d], uv1, ctx),
        ]
    }

    fn push_triangle(&mut self, verts: [VH; 3], uv: Option<[DVec2; 3]>, ctx: &AddContext) -> TH {
        self.touch();
        if ctx.normal.is_some() {
            self.status.set_triangle_normals(true);
        }
        let ti: TH = (self.triangles.len() as u32).into();
        let color = ctx.color.unwrap_or(WHITE);
        // Missing corners are left for the self check to report.
        let corners = verts.map(|v| self.vertices.get(v.index() as usize));
        let n = match (ctx.normal, corners) {
            (Some(n), _) => n,
            (None, [Some(p0), Some(p1), Some(p2)]) => {
                (p1.pos - p0.pos).cross(p2.pos - p0.pos).normalize_or_zero()
            }
            (None, _) => DVec3::ZERO,
        };
        let default_uv = corners.map(|v| v.map_or(DVec2::ZERO, |v| v.uv));
        let first = self.edges.len() as u32;
        for i in 0..3 {
            let mut e = Edge::new(verts[i], verts[(i + 1) % 3]);
            e.attach(ti);
            e.n = n;
            e.c = color;
            self.edges.push(e);
        }
        let mut t = Triangle::new(verts, [first.into(), (first + 1).into(), (first + 2).into()]);
        t.n = n;
        t.c = color;
        t.uv = uv.unwrap_or(default_uv);
        self.triangles.push(t);
        ti
    }

    /// Append all elements of `other`, translating its references into the
    /// numbering of this mesh.
    pub fn add_from(&mut self, other: &Mesh) -> Result<(), Error> {
        let (estart, tstart) = (self.edges.len(), self.triangles.len());
        self.maps = Default::default();
        self.vertices.reserve(other.vertices.len());
        self.edges.reserve(other.edges.len());
        self.triangles.reserve(other.triangles.len());
        for (i, v) in other.vertices.iter().enumerate() {
            self.add_vertex_mapped(*v, i);
        }
        for (i, e) in other.edges.iter().enumerate() {
            self.add_edge_mapped(*e, i);
        }
        for (i, t) in other.triangles.iter().enumerate() {
            self.add_triangle_mapped(*t, i);
        }
        self.remap(estart, tstart)
    }

    /// Append the vertices selected in `other`, and the edges and triangles of
    /// `other` whose vertices are all selected. Triangle slots of copied edges
    /// that point at triangles which were not copied are cleared.
    pub fn add_selected_from(&mut self, other: &Mesh) -> Result<(), Error> {
        let (estart, tstart) = (self.edges.len(), self.triangles.len());
        self.maps = Default::default();
        // Sized to the source so that unselected elements map to nothing.
        self.maps.vmap = crate::remap::IndexMap::from_entries(vec![None; other.vertices.len()]);
        self.maps.emap = crate::remap::IndexMap::from_entries(vec![None; other.edges.len()]);
        self.maps.tmap = crate::remap::IndexMap::from_entries(vec![None; other.triangles.len()]);
        for &v in other.selection.iter() {
            let vertex = *other.vertex(v)?;
            self.add_vertex_mapped(vertex, v.index() as usize);
        }
        let selected = |mesh: &Mesh, v: VH| -> Result<bool, Error> {
            Ok(mesh.maps.vmap.get(v)?.is_some())
        };
        for (i, e) in other.edges.iter().enumerate() {
            if selected(&*self, e.va)? && selected(&*self, e.vb)? {
                self.add_edge_mapped(*e, i);
            }
        }
        for (i, t) in other.triangles.iter().enumerate() {
            let [a, b, c] = t.vertices();
            if selected(&*self, a)? && selected(&*self, b)? && selected(&*self, c)? {
                self.add_triangle_mapped(*t, i);
            }
        }
        self.remap(estart, tstart)
    }
}
