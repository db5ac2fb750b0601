use std::{
    collections::BTreeSet,
    ops::{Index, IndexMut},
};

use glam::DVec3;

use crate::{
    element::{EH, Edge, Handle, TH, Triangle, VH, Vertex},
    error::Error,
    remap::Maps,
    status::Status,
};

/// Distance below which two vertices are considered coincident.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Indexed triangle mesh.
///
/// Vertices, edges and triangles live in flat arrays and refer to each other by
/// index. A mesh is built from an arbitrary triangle soup with the `add_*`
/// functions and brought into canonical form with [`Mesh::finish`], which
/// merges coincident vertices, shares edges between adjacent triangles and
/// computes normals.
///
/// Handles are only meaningful until the next call that reorders the arrays
/// ([`Mesh::sort`], [`Mesh::join`], [`Mesh::finish`]). Callers holding handles
/// across such calls must derive them again.
///
/// A mesh has no interior mutability; distinct instances can be used from
/// different threads, but a single instance must not be mutated concurrently.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) maps: Maps,
    pub(crate) selection: BTreeSet<VH>,
    pub(crate) status: Status,
    pub(crate) epsilon: f64,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Mesh {
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            maps: Maps::default(),
            selection: BTreeSet::new(),
            status: Status::default(),
            epsilon,
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, ntris: usize) -> Self {
        Mesh {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            triangles: Vec::with_capacity(ntris),
            ..Self::new()
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.finished()
    }

    /// Remove all elements, maps and the selection. The epsilon is kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.triangles.clear();
        self.maps = Maps::default();
        self.selection.clear();
        self.status = Status::default();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn triangles(&self) -> impl Iterator<Item = TH> + use<> {
        (0..(self.num_triangles() as u32)).map(|i| i.into())
    }

    pub fn vertex_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn triangle_slice(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn vertex(&self, v: VH) -> Result<&Vertex, Error> {
        let len = self.vertices.len();
        self.vertices
            .get(v.index() as usize)
            .ok_or(Error::out_of_range(v, len))
    }

    pub fn vertex_mut(&mut self, v: VH) -> Result<&mut Vertex, Error> {
        let len = self.vertices.len();
        self.vertices
            .get_mut(v.index() as usize)
            .ok_or(Error::out_of_range(v, len))
    }

    pub fn edge(&self, e: EH) -> Result<&Edge, Error> {
        let len = self.edges.len();
        self.edges
            .get(e.index() as usize)
            .ok_or(Error::out_of_range(e, len))
    }

    pub fn edge_mut(&mut self, e: EH) -> Result<&mut Edge, Error> {
        let len = self.edges.len();
        self.edges
            .get_mut(e.index() as usize)
            .ok_or(Error::out_of_range(e, len))
    }

    pub fn triangle(&self, t: TH) -> Result<&Triangle, Error> {
        let len = self.triangles.len();
        self.triangles
            .get(t.index() as usize)
            .ok_or(Error::out_of_range(t, len))
    }

    pub fn triangle_mut(&mut self, t: TH) -> Result<&mut Triangle, Error> {
        let len = self.triangles.len();
        self.triangles
            .get_mut(t.index() as usize)
            .ok_or(Error::out_of_range(t, len))
    }

    /// The vertex at `corner` (0, 1 or 2) of triangle `t`.
    pub fn triangle_vertex(&self, t: TH, corner: usize) -> Result<&Vertex, Error> {
        let verts = self.triangle(t)?.vertices();
        let v = *verts.get(corner).ok_or(Error::IndexOutOfRange {
            kind: "corner",
            index: corner,
            len: 3,
        })?;
        self.vertex(v)
    }

    /// The vertex at `end` (0 for `va`, 1 for `vb`) of edge `e`.
    pub fn edge_vertex(&self, e: EH, end: usize) -> Result<&Vertex, Error> {
        let verts = self.edge(e)?.vertices();
        let v = *verts.get(end).ok_or(Error::IndexOutOfRange {
            kind: "edge end",
            index: end,
            len: 2,
        })?;
        self.vertex(v)
    }

    /// Position of vertex `v`. Panics if `v` is out of range.
    pub fn point(&self, v: VH) -> DVec3 {
        self[v].pos
    }

    /// The positions of the three corners of `t`, in stored order.
    pub fn triangle_points(&self, t: TH) -> [DVec3; 3] {
        self[t].vertices().map(|v| self.point(v))
    }

    /// The axis aligned box containing all vertices, or `None` if the mesh has
    /// no vertices.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        self.vertices.iter().fold(None, |bounds, v| match bounds {
            None => Some((v.pos, v.pos)),
            Some((lo, hi)) => Some((lo.min(v.pos), hi.max(v.pos))),
        })
    }

    // Selection.

    pub fn selection(&self) -> &BTreeSet<VH> {
        &self.selection
    }

    pub fn is_selected(&self, v: VH) -> bool {
        self.selection.contains(&v)
    }

    pub fn select_vertex(&mut self, v: VH) -> Result<(), Error> {
        self.vertex(v)?;
        self.selection.insert(v);
        Ok(())
    }

    pub fn deselect_vertex(&mut self, v: VH) {
        self.selection.remove(&v);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

impl Index<VH> for Mesh {
    type Output = Vertex;

    fn index(&self, v: VH) -> &Self::Output {
        &self.vertices[v.index() as usize]
    }
}

impl IndexMut<VH> for Mesh {
    fn index_mut(&mut self, v: VH) -> &mut Self::Output {
        &mut self.vertices[v.index() as usize]
    }
}

impl Index<EH> for Mesh {
    type Output = Edge;

    fn index(&self, e: EH) -> &Self::Output {
        &self.edges[e.index() as usize]
    }
}

impl IndexMut<EH> for Mesh {
    fn index_mut(&mut self, e: EH) -> &mut Self::Output {
        &mut self.edges[e.index() as usize]
    }
}

impl Index<TH> for Mesh {
    type Output = Triangle;

    fn index(&self, t: TH) -> &Self::Output {
        &self.triangles[t.index() as usize]
    }
}

impl IndexMut<TH> for Mesh {
    fn index_mut(&mut self, t: TH) -> &mut Self::Output {
        &mut self.triangles[t.index() as usize]
    }
}
