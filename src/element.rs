use glam::{DVec2, DVec3, Vec4};
use std::fmt::{Debug, Display};

/**
 * All elements of the mesh implement this trait. They are identified by their
 * index.
 */
pub trait Handle: Copy + From<u32> {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;

    /// Name of the element kind, used in error messages and diagnostics.
    const KIND: &'static str;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Edge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EH {
    idx: u32,
}

/**
 * Triangle handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TH {
    idx: u32,
}

impl Handle for VH {
    const KIND: &'static str = "vertex";

    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl From<&u32> for VH {
    fn from(idx: &u32) -> Self {
        VH { idx: *idx }
    }
}

impl Handle for EH {
    const KIND: &'static str = "edge";

    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for EH {
    fn from(idx: u32) -> Self {
        EH { idx }
    }
}

impl From<&u32> for EH {
    fn from(idx: &u32) -> Self {
        EH { idx: *idx }
    }
}

impl Handle for TH {
    const KIND: &'static str = "triangle";

    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for TH {
    fn from(idx: u32) -> Self {
        TH { idx }
    }
}

impl From<&u32> for TH {
    fn from(idx: &u32) -> Self {
        TH { idx: *idx }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Display for TH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Debug for TH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TH({})", self.index())
    }
}

/// Opaque white, the color given to entities when nothing else is known.
pub const WHITE: Vec4 = Vec4::ONE;

/// A point of the mesh with its shading attributes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub pos: DVec3,
    pub n: DVec3,
    pub c: Vec4,
    pub uv: DVec2,
    pub group: Option<u32>,
}

impl Vertex {
    pub fn new(pos: DVec3) -> Self {
        Vertex {
            pos,
            n: DVec3::ZERO,
            c: WHITE,
            uv: DVec2::ZERO,
            group: None,
        }
    }

    pub fn with_normal(mut self, n: DVec3) -> Self {
        self.n = n;
        self
    }

    pub fn with_color(mut self, c: Vec4) -> Self {
        self.c = c;
        self
    }

    pub fn with_uv(mut self, uv: DVec2) -> Self {
        self.uv = uv;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}

/// An edge between two vertices, with up to two incident triangles recorded.
///
/// `flip` is set when the stored order `(va, vb)` is the reverse of the
/// direction the edge was created with. `triangle_count` counts all incident
/// triangles, even when more than two are attached; only the first two are
/// stored in `ta` and `tb`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub va: VH,
    pub vb: VH,
    pub ta: Option<TH>,
    pub tb: Option<TH>,
    pub triangle_count: u32,
    pub flip: bool,
    pub sharp: bool,
    pub group: Option<u32>,
    pub n: DVec3,
    pub c: Vec4,
}

impl Edge {
    pub fn new(va: VH, vb: VH) -> Self {
        Edge {
            va,
            vb,
            ta: None,
            tb: None,
            triangle_count: 0,
            flip: false,
            sharp: false,
            group: None,
            n: DVec3::ZERO,
            c: WHITE,
        }
    }

    /// Both vertices, in stored order.
    pub fn vertices(&self) -> [VH; 2] {
        [self.va, self.vb]
    }

    /// An edge is collapsed if both ends are the same vertex.
    pub fn is_collapsed(&self) -> bool {
        self.va == self.vb
    }

    /// Check if this edge connects `a` and `b`, in either order.
    pub fn connects(&self, a: VH, b: VH) -> bool {
        (self.va == a && self.vb == b) || (self.va == b && self.vb == a)
    }

    /// The vertex at the other end of the edge.
    pub fn other_vertex(&self, v: VH) -> VH {
        if self.va == v { self.vb } else { self.va }
    }

    /// Put the vertices in ascending order, toggling `flip` when a swap was
    /// needed. The triangle slots are put in ascending order as well.
    pub fn fix(&mut self) {
        if self.va > self.vb {
            std::mem::swap(&mut self.va, &mut self.vb);
            self.flip = !self.flip;
        }
        if let (Some(ta), Some(tb)) = (self.ta, self.tb) {
            if ta > tb {
                self.ta = Some(tb);
                self.tb = Some(ta);
            }
        }
    }

    /// Attach a triangle to the first free slot and count it.
    pub(crate) fn attach(&mut self, t: TH) {
        if self.ta.is_none() {
            self.ta = Some(t);
        } else if self.tb.is_none() {
            self.tb = Some(t);
        }
        self.triangle_count += 1;
    }

    pub(crate) fn detach_all(&mut self) {
        self.ta = None;
        self.tb = None;
        self.triangle_count = 0;
    }

    /// Take the orientation of `t`, which has this edge on `side`.
    pub(crate) fn orient_along(&mut self, t: &Triangle, side: usize) {
        let (a, _) = t.side_vertices(side);
        self.flip = t.flip != (self.va != a);
    }

    /// The stored incident triangles.
    pub fn triangles(&self) -> impl Iterator<Item = TH> + use<> {
        self.ta.into_iter().chain(self.tb)
    }
}

/// A triangle referencing three vertices and the three edges along its sides.
///
/// `ea` runs along `(va, vb)`, `eb` along `(vb, vc)` and `ec` along `(vc, va)`.
/// `flip` is set when the stored vertex order is an odd permutation of the
/// winding the triangle was created with. Texture coordinates are stored per
/// corner, in the same order as the vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub va: VH,
    pub vb: VH,
    pub vc: VH,
    pub ea: EH,
    pub eb: EH,
    pub ec: EH,
    pub flip: bool,
    pub uv: [DVec2; 3],
    pub t: DVec3,
    pub b: DVec3,
    pub n: DVec3,
    pub c: Vec4,
    pub group: Option<u32>,
}

/// For each of the six orderings of three corners: the permutation, and
/// whether it is odd.
const CORNER_ORDERS: [([usize; 3], bool); 6] = [
    ([0, 1, 2], false),
    ([1, 2, 0], false),
    ([2, 0, 1], false),
    ([0, 2, 1], true),
    ([1, 0, 2], true),
    ([2, 1, 0], true),
];

/// Index of the side joining corners `i` and `j`.
const fn side(i: usize, j: usize) -> usize {
    (4 - i - j) % 3
}

impl Triangle {
    pub fn new(verts: [VH; 3], edges: [EH; 3]) -> Self {
        Triangle {
            va: verts[0],
            vb: verts[1],
            vc: verts[2],
            ea: edges[0],
            eb: edges[1],
            ec: edges[2],
            flip: false,
            uv: [DVec2::ZERO; 3],
            t: DVec3::ZERO,
            b: DVec3::ZERO,
            n: DVec3::ZERO,
            c: WHITE,
            group: None,
        }
    }

    pub fn vertices(&self) -> [VH; 3] {
        [self.va, self.vb, self.vc]
    }

    pub fn edges(&self) -> [EH; 3] {
        [self.ea, self.eb, self.ec]
    }

    pub(crate) fn set_vertices(&mut self, verts: [VH; 3]) {
        [self.va, self.vb, self.vc] = verts;
    }

    pub(crate) fn set_edges(&mut self, edges: [EH; 3]) {
        [self.ea, self.eb, self.ec] = edges;
    }

    /// A triangle is collapsed if any two of its corners are the same vertex.
    pub fn is_collapsed(&self) -> bool {
        self.va == self.vb || self.vb == self.vc || self.vc == self.va
    }

    /// The vertex pair spanned by the edge on the given side.
    pub fn side_vertices(&self, side: usize) -> (VH, VH) {
        match side {
            0 => (self.va, self.vb),
            1 => (self.vb, self.vc),
            _ => (self.vc, self.va),
        }
    }

    /// Reorder the corners so that `va <= vb <= vc`, carrying the edges and
    /// texture coordinates along. Toggles `flip` for odd permutations.
    pub fn fix(&mut self) {
        let v = self.vertices();
        let e = self.edges();
        let uv = self.uv;
        let &(p, odd) = CORNER_ORDERS
            .iter()
            .find(|(p, _)| v[p[0]] <= v[p[1]] && v[p[1]] <= v[p[2]])
            .unwrap_or(&CORNER_ORDERS[0]);
        self.set_vertices([v[p[0]], v[p[1]], v[p[2]]]);
        self.set_edges([e[side(p[0], p[1])], e[side(p[1], p[2])], e[side(p[2], p[0])]]);
        self.uv = [uv[p[0]], uv[p[1]], uv[p[2]]];
        if odd {
            self.flip = !self.flip;
        }
    }

    /// Which side of this triangle `e` lies on, if any.
    pub fn side_of(&self, e: EH) -> Option<usize> {
        self.edges().iter().position(|x| *x == e)
    }
}
