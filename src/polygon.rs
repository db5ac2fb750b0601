/*!
Polygons in 3D made of vertices and directed edges, such as the outlines
produced by slicing a mesh with a plane.
*/

use std::{collections::HashSet, ops::Range};

use glam::{DVec2, DVec3};

use crate::{
    canonical::weld,
    element::{EH, Handle, VH},
    error::Error,
    mesh::{DEFAULT_EPSILON, Mesh},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonVertex {
    pub pos: DVec3,
    pub n: DVec3,
}

/// Directed edge from `va` to `vb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolygonEdge {
    pub va: VH,
    pub vb: VH,
}

/// Set of polylines and loops in 3D.
///
/// Edges are directed. After [`Polygon3::sort_loop`] the edges of each chain
/// are stored consecutively, head to tail, and the vertices are numbered in the
/// order the chains visit them.
#[derive(Debug, Clone)]
pub struct Polygon3 {
    vertices: Vec<PolygonVertex>,
    edges: Vec<PolygonEdge>,
    epsilon: f64,
}

impl Default for Polygon3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygon3 {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Polygon3 {
            vertices: Vec::new(),
            edges: Vec::new(),
            epsilon,
        }
    }

    /// Polygon made of a single closed loop through `points`.
    pub fn from_loop(points: &[DVec3]) -> Self {
        let mut poly = Self::new();
        for p in points {
            poly.add_vertex(*p, DVec3::ZERO);
        }
        let n = points.len() as u32;
        for i in 0..n {
            poly.add_edge(i.into(), ((i + 1) % n).into());
        }
        poly
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn add_vertex(&mut self, pos: DVec3, n: DVec3) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(PolygonVertex { pos, n });
        vi.into()
    }

    pub fn add_edge(&mut self, va: VH, vb: VH) -> EH {
        let ei = self.edges.len() as u32;
        self.edges.push(PolygonEdge { va, vb });
        ei.into()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn vertices(&self) -> &[PolygonVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[PolygonEdge] {
        &self.edges
    }

    pub fn point(&self, v: VH) -> DVec3 {
        self.vertices[v.index() as usize].pos
    }

    fn edge_points(&self, e: &PolygonEdge) -> (DVec3, DVec3) {
        (self.point(e.va), self.point(e.vb))
    }

    /// Merge vertices within epsilon of each other along every axis, then drop
    /// edges that collapse to a point and repeated edges.
    pub fn join(&mut self) {
        let positions: Vec<DVec3> = self.vertices.iter().map(|v| v.pos).collect();
        let owner = weld(&positions, self.epsilon);
        let mut map: Vec<VH> = Vec::with_capacity(owner.len());
        let mut kept: Vec<PolygonVertex> = Vec::with_capacity(owner.len());
        let mut new_index = vec![0u32; owner.len()];
        for (i, &o) in owner.iter().enumerate() {
            if o == i {
                new_index[i] = kept.len() as u32;
                kept.push(self.vertices[i]);
            }
        }
        for (i, &o) in owner.iter().enumerate() {
            let dst = new_index[o];
            if o != i {
                kept[dst as usize].n += self.vertices[i].n;
            }
            map.push(dst.into());
        }
        for v in kept.iter_mut() {
            v.n = v.n.normalize_or_zero();
        }
        self.vertices = kept;
        let mut seen = HashSet::with_capacity(self.edges.len());
        let edges = std::mem::take(&mut self.edges);
        self.edges = edges
            .into_iter()
            .map(|e| PolygonEdge {
                va: map[e.va.index() as usize],
                vb: map[e.vb.index() as usize],
            })
            .filter(|e| e.va != e.vb && seen.insert(*e))
            .collect();
    }

    /// Reorder the edges into chains, each stored head to tail, and renumber
    /// the vertices in the order the chains visit them. Open chains come
    /// first, starting from vertices with more outgoing than incoming edges.
    /// Returns the number of chains.
    pub fn sort_loop(&mut self) -> usize {
        let nv = self.vertices.len();
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nv];
        let mut incoming = vec![0usize; nv];
        for (i, e) in self.edges.iter().enumerate() {
            outgoing[e.va.index() as usize].push(i);
            incoming[e.vb.index() as usize] += 1;
        }
        // Popped from the back, so the lowest edge is taken first.
        for out in outgoing.iter_mut() {
            out.reverse();
        }
        let starts: Vec<usize> = (0..nv)
            .filter(|&v| outgoing[v].len() > incoming[v])
            .chain(0..nv)
            .collect();
        let mut order = Vec::with_capacity(self.edges.len());
        let mut nchains = 0;
        for v in starts {
            while let Some(first) = outgoing[v].pop() {
                nchains += 1;
                let mut e = first;
                loop {
                    order.push(e);
                    match outgoing[self.edges[e].vb.index() as usize].pop() {
                        Some(next) => e = next,
                        None => break,
                    }
                }
            }
        }
        // Renumber the vertices in visiting order.
        let mut map: Vec<Option<u32>> = vec![None; nv];
        let mut vorder: Vec<usize> = Vec::with_capacity(nv);
        let mut visit = |v: VH, vorder: &mut Vec<usize>| {
            let slot = &mut map[v.index() as usize];
            if slot.is_none() {
                *slot = Some(vorder.len() as u32);
                vorder.push(v.index() as usize);
            }
        };
        for &e in &order {
            visit(self.edges[e].va, &mut vorder);
            visit(self.edges[e].vb, &mut vorder);
        }
        for v in 0..nv {
            visit((v as u32).into(), &mut vorder);
        }
        let remap = |v: VH| -> VH { map[v.index() as usize].unwrap_or(v.index()).into() };
        self.edges = order
            .iter()
            .map(|&e| {
                let e = self.edges[e];
                PolygonEdge {
                    va: remap(e.va),
                    vb: remap(e.vb),
                }
            })
            .collect();
        self.vertices = vorder.iter().map(|&v| self.vertices[v]).collect();
        nchains
    }

    /// Ranges of consecutive edges that join head to tail.
    pub fn chains(&self) -> Vec<Range<usize>> {
        let mut chains = Vec::new();
        let mut start = 0;
        for i in 1..=self.edges.len() {
            let ends = i == self.edges.len() || self.edges[i - 1].vb != self.edges[i].va;
            // A loop closes on the first vertex of its chain.
            let closes = i < self.edges.len() && self.edges[i - 1].vb == self.edges[start].va;
            if ends || closes {
                chains.push(start..i);
                start = i;
            }
        }
        chains
    }

    /// True if every vertex used by an edge starts exactly one edge and ends
    /// exactly one edge.
    pub fn is_closed(&self) -> bool {
        if self.edges.is_empty() {
            return false;
        }
        let mut balance = vec![(0u32, 0u32); self.vertices.len()];
        for e in self.edges.iter() {
            balance[e.va.index() as usize].0 += 1;
            balance[e.vb.index() as usize].1 += 1;
        }
        balance
            .iter()
            .all(|&(out, inc)| (out == 0 && inc == 0) || (out == 1 && inc == 1))
    }

    /// Total length of all edges.
    pub fn length(&self) -> f64 {
        self.edges
            .iter()
            .map(|e| {
                let (a, b) = self.edge_points(e);
                a.distance(b)
            })
            .sum()
    }

    /// Vector area of the loops. Its direction is the normal of the loops by
    /// the right hand rule, and its length the enclosed area when the loops
    /// are planar.
    pub fn vector_area(&self) -> DVec3 {
        0.5 * self
            .edges
            .iter()
            .map(|e| {
                let (a, b) = self.edge_points(e);
                a.cross(b)
            })
            .sum::<DVec3>()
    }

    pub fn area(&self) -> f64 {
        self.vector_area().length()
    }

    /// Remove vertices where a chain continues straight on, merging the two
    /// edges around each of them. Returns the number of vertices removed.
    pub fn simplify(&mut self) -> usize {
        let nv = self.vertices.len();
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); nv];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nv];
        for (i, e) in self.edges.iter().enumerate() {
            outgoing[e.va.index() as usize].push(i);
            incoming[e.vb.index() as usize].push(i);
        }
        let mut removed_edges = vec![false; self.edges.len()];
        let mut removed = vec![false; nv];
        for v in 0..nv {
            let (&[ein], &[eout]) = (incoming[v].as_slice(), outgoing[v].as_slice()) else {
                continue;
            };
            let (u, w) = (self.edges[ein].va, self.edges[eout].vb);
            if u == w {
                continue;
            }
            let (pu, pv, pw) = (
                self.point(u),
                self.vertices[v].pos,
                self.point(w),
            );
            let along = pw - pu;
            let len = along.length();
            if len <= self.epsilon {
                continue;
            }
            let offset = (pv - pu).cross(along).length() / len;
            let between = (pv - pu).dot(along) > 0.0 && (pw - pv).dot(along) > 0.0;
            if offset > self.epsilon || !between {
                continue;
            }
            // Extend the incoming edge over the outgoing one.
            self.edges[ein].vb = w;
            removed_edges[eout] = true;
            removed[v] = true;
            if let Some(slot) = incoming[w.index() as usize].iter_mut().find(|e| **e == eout) {
                *slot = ein;
            }
        }
        let count = removed.iter().filter(|r| **r).count();
        if count == 0 {
            return 0;
        }
        let mut map = vec![0u32; nv];
        let mut kept = Vec::with_capacity(nv - count);
        for (i, v) in self.vertices.iter().enumerate() {
            if !removed[i] {
                map[i] = kept.len() as u32;
                kept.push(*v);
            }
        }
        self.vertices = kept;
        let edges = std::mem::take(&mut self.edges);
        self.edges = edges
            .into_iter()
            .zip(removed_edges)
            .filter(|(_, r)| !r)
            .map(|(e, _)| PolygonEdge {
                va: map[e.va.index() as usize].into(),
                vb: map[e.vb.index() as usize].into(),
            })
            .collect();
        count
    }

    /// The loops as lists of vertices in order. The polygon must be closed.
    fn loops(&self) -> Vec<Vec<VH>> {
        let mut next: Vec<Option<VH>> = vec![None; self.vertices.len()];
        for e in self.edges.iter() {
            next[e.va.index() as usize] = Some(e.vb);
        }
        let mut visited = vec![false; self.vertices.len()];
        let mut loops = Vec::new();
        for e in self.edges.iter() {
            if visited[e.va.index() as usize] {
                continue;
            }
            let mut current = Vec::new();
            let mut v = e.va;
            while !std::mem::replace(&mut visited[v.index() as usize], true) {
                current.push(v);
                match next[v.index() as usize] {
                    Some(n) => v = n,
                    None => break,
                }
            }
            loops.push(current);
        }
        loops
    }

    /// Fill every loop with triangles by ear clipping, and return them as a
    /// finished mesh. Each loop is filled on its own, so loops must not be
    /// nested.
    ///
    /// Fails if the polygon is not closed, or if a loop has no area or
    /// intersects itself.
    pub fn triangulate(&self) -> Result<Mesh, Error> {
        if !self.is_closed() {
            return Err(Error::OpenPolygon);
        }
        let mut mesh = Mesh::with_epsilon(self.epsilon);
        let first = mesh
            .add_vertices(&self.vertices.iter().map(|v| v.pos).collect::<Vec<_>>())
            .start;
        let vert = |v: VH| -> VH { (first + v.index()).into() };
        for lp in self.loops() {
            let area: DVec3 = 0.5
                * (0..lp.len())
                    .map(|i| self.point(lp[i]).cross(self.point(lp[(i + 1) % lp.len()])))
                    .sum::<DVec3>();
            let normal = area.normalize_or_zero();
            if lp.len() < 3 || area.length() <= self.epsilon * self.epsilon {
                return Err(Error::DegeneratePolygon);
            }
            let e1 = normal.any_orthonormal_vector();
            let e2 = normal.cross(e1);
            let flat: Vec<DVec2> = lp
                .iter()
                .map(|v| {
                    let p = self.point(*v);
                    DVec2::new(p.dot(e1), p.dot(e2))
                })
                .collect();
            for [a, b, c] in clip_ears(&flat)? {
                mesh.add_triangle(vert(lp[a]), vert(lp[b]), vert(lp[c]));
            }
        }
        mesh.finish()?;
        Ok(mesh)
    }
}

/// Strictly inside the counter clockwise triangle `abc`.
/// Whether `p` lies inside or on the boundary of the counter clockwise
/// triangle `a`, `b`, `c`. The corners themselves do not count.
fn inside(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    if p == a || p == b || p == c {
        return false;
    }
    (b - a).perp_dot(p - a) >= 0.0
        && (c - b).perp_dot(p - b) >= 0.0
        && (a - c).perp_dot(p - c) >= 0.0
}

/// Triangulate a counter clockwise simple polygon. Returns corner indices.
fn clip_ears(points: &[DVec2]) -> Result<Vec<[usize; 3]>, Error> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));
    while remaining.len() > 3 {
        let m = remaining.len();
        let corners = |i: usize| {
            (
                remaining[(i + m - 1) % m],
                remaining[i],
                remaining[(i + 1) % m],
            )
        };
        let ear = (0..m).find(|&i| {
            let (a, b, c) = corners(i);
            let (pa, pb, pc) = (points[a], points[b], points[c]);
            (pb - pa).perp_dot(pc - pb) > 0.0
                && remaining
                    .iter()
                    .filter(|&&j| j != a && j != b && j != c)
                    .all(|&j| !inside(points[j], pa, pb, pc))
        });
        let Some(i) = ear else {
            return Err(Error::DegeneratePolygon);
        };
        let (a, b, c) = corners(i);
        triangles.push([a, b, c]);
        remaining.remove(i);
    }
    if let [a, b, c] = remaining[..] {
        triangles.push([a, b, c]);
    }
    Ok(triangles)
}
