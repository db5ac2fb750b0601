/*!
Canonicalization of a mesh: fixing the order of references inside each
element, sorting the element arrays, and merging duplicates.

The pipeline runs `fix -> sort -> join -> finish`. Every step renumbers
elements through an [`IndexMap`] which is then applied to the references held
by the other arrays.
*/

use std::{cmp::Ordering, collections::HashMap};

use glam::DVec3;

use crate::{
    element::{EH, Edge, Handle, TH, Triangle, VH, Vertex},
    error::Error,
    mesh::Mesh,
    remap::{IndexMap, init_permutation, permute},
};

/// Lexicographic order of positions: x, then y, then z.
pub(crate) fn cmp_position(a: DVec3, b: DVec3) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

/// True if `a` and `b` are within `eps` of each other along every axis.
pub(crate) fn coincident(a: DVec3, b: DVec3, eps: f64) -> bool {
    (a - b).abs().cmple(DVec3::splat(eps)).all()
}

/// Cell of the spatial hash containing `p`.
fn cell_of(p: DVec3, size: f64) -> (i64, i64, i64) {
    let c = (p / size).floor();
    (c.x as i64, c.y as i64, c.z as i64)
}

/// Find coincident positions. The returned vector holds, for every position,
/// the index of the position it is merged into; survivors map to themselves.
///
/// Positions are visited in lexicographic order. Each one merges into the
/// earliest survivor within `eps` along all axes, or becomes a survivor
/// itself, so no two survivors are coincident. Survivors are looked up in a
/// spatial hash with cells of twice `eps`, so only the 27 cells around a
/// position are searched.
pub(crate) fn weld(positions: &[DVec3], eps: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| cmp_position(positions[a], positions[b]));
    let size = (2.0 * eps).max(f64::MIN_POSITIVE);
    // Survivors per cell, as (rank in sorted order, index).
    let mut cells: HashMap<(i64, i64, i64), Vec<(usize, usize)>> = HashMap::new();
    let mut owner: Vec<usize> = (0..positions.len()).collect();
    for (rank, &b) in order.iter().enumerate() {
        let pb = positions[b];
        let (x, y, z) = cell_of(pb, size);
        let mut first: Option<(usize, usize)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = cells.get(&(x + dx, y + dy, z + dz)) else {
                        continue;
                    };
                    for &(r, a) in candidates {
                        if coincident(positions[a], pb, eps) && first.is_none_or(|(fr, _)| r < fr) {
                            first = Some((r, a));
                        }
                    }
                }
            }
        }
        match first {
            Some((_, a)) => owner[b] = a,
            None => cells.entry((x, y, z)).or_default().push((rank, b)),
        }
    }
    owner
}

impl Mesh {
    /// Put the vertices of every edge in ascending order, and the corners of
    /// every triangle in ascending order. The `flip` bits record the change
    /// of orientation.
    pub fn fix(&mut self) {
        self.fix_edges();
        self.fix_triangles();
    }

    pub fn fix_edges(&mut self) {
        for e in self.edges.iter_mut() {
            e.fix();
        }
    }

    pub fn fix_triangles(&mut self) {
        for t in self.triangles.iter_mut() {
            t.fix();
        }
    }

    /// Sort the vertices by position, the edges by their vertex pair and the
    /// triangles by their vertex triple, keeping all references consistent.
    ///
    /// Sorting an already sorted mesh leaves it unchanged.
    pub fn sort(&mut self) -> Result<(), Error> {
        self.sort_vertices()?;
        self.fix_edges();
        self.sort_edges()?;
        self.fix_triangles();
        self.sort_triangles()?;
        self.fix_edges();
        Ok(())
    }

    pub(crate) fn sort_vertices(&mut self) -> Result<(), Error> {
        let mut perm: Vec<VH> = init_permutation(self.vertices.len());
        perm.sort_by(|a, b| cmp_position(self[*a].pos, self[*b].pos));
        self.vertices = permute(&self.vertices, &perm);
        let vmap = IndexMap::from_permutation(&perm);
        self.apply_vertex_map(&vmap, 0, 0)?;
        self.remap_selection(&vmap)
    }

    pub(crate) fn sort_edges(&mut self) -> Result<(), Error> {
        let mut perm: Vec<EH> = init_permutation(self.edges.len());
        perm.sort_by_key(|e| {
            let e = &self[*e];
            (e.va, e.vb)
        });
        self.edges = permute(&self.edges, &perm);
        self.apply_edge_map(&IndexMap::from_permutation(&perm), 0)
    }

    pub(crate) fn sort_triangles(&mut self) -> Result<(), Error> {
        let mut perm: Vec<TH> = init_permutation(self.triangles.len());
        perm.sort_by_key(|t| self[*t].vertices());
        self.triangles = permute(&self.triangles, &perm);
        self.apply_triangle_map(&IndexMap::from_permutation(&perm), 0)
    }

    fn remap_selection(&mut self, vmap: &IndexMap<VH>) -> Result<(), Error> {
        let old = std::mem::take(&mut self.selection);
        for v in old {
            if let Some(v) = vmap.get(v)? {
                self.selection.insert(v);
            }
        }
        Ok(())
    }

    /// Sort the mesh and merge duplicates.
    ///
    /// Vertices within epsilon of each other along every axis are merged into
    /// the first one in sorted order, which absorbs the normals and colors of
    /// the others. Edges that collapse to a point are dropped, and edges
    /// joining the same pair of vertices are merged. Collapsed and duplicate
    /// triangles are dropped. If merging changed which triangles an edge
    /// borders, the triangle slots of all edges are rebuilt.
    pub fn join(&mut self) -> Result<(), Error> {
        let (nv, ne, nt) = (self.num_vertices(), self.num_edges(), self.num_triangles());
        self.sort_vertices()?;
        self.join_vertices()?;
        self.fix_edges();
        let mut reassign = self.join_edges()?;
        self.fix_triangles();
        reassign = self.join_triangles(reassign)?;
        if reassign {
            self.rebuild_edge_triangles();
        }
        self.fix_edges();
        log::debug!(
            "Joined mesh: {} -> {} vertices, {} -> {} edges, {} -> {} triangles",
            nv,
            self.num_vertices(),
            ne,
            self.num_edges(),
            nt,
            self.num_triangles()
        );
        Ok(())
    }

    /// Merge coincident vertices. The vertices must be sorted.
    fn join_vertices(&mut self) -> Result<(), Error> {
        let positions: Vec<DVec3> = self.vertices.iter().map(|v| v.pos).collect();
        let owner = weld(&positions, self.epsilon);
        let mut map: Vec<Option<VH>> = vec![None; owner.len()];
        let mut kept: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        for (i, &o) in owner.iter().enumerate() {
            if o == i {
                map[i] = Some((kept.len() as u32).into());
                kept.push(self.vertices[i]);
            }
        }
        let mut merged = vec![0usize; kept.len()];
        for (i, &o) in owner.iter().enumerate() {
            if o == i {
                continue;
            }
            if let Some(dst) = map[o] {
                let survivor = &mut kept[dst.index() as usize];
                let absorbed = &self.vertices[i];
                survivor.n += absorbed.n;
                survivor.c += absorbed.c;
                merged[dst.index() as usize] += 1;
                map[i] = Some(dst);
            }
        }
        for (v, count) in kept.iter_mut().zip(merged) {
            if count > 0 {
                v.n = v.n.normalize_or_zero();
                v.c /= (count + 1) as f32;
            }
        }
        self.vertices = kept;
        let vmap = IndexMap::from_entries(map);
        self.apply_vertex_map(&vmap, 0, 0)?;
        self.remap_selection(&vmap)
    }

    /// Drop collapsed edges and merge edges joining the same vertices. Edges
    /// must be fixed. Returns true if the triangle slots must be rebuilt.
    fn join_edges(&mut self) -> Result<bool, Error> {
        let mut perm: Vec<EH> = init_permutation(self.edges.len());
        perm.sort_by_key(|e| {
            let e = &self[*e];
            (e.va, e.vb)
        });
        let mut reassign = false;
        let mut map: Vec<Option<EH>> = vec![None; self.edges.len()];
        let mut kept: Vec<Edge> = Vec::with_capacity(self.edges.len());
        let mut counts: Vec<usize> = Vec::with_capacity(self.edges.len());
        for old in perm {
            let e = self[old];
            if e.is_collapsed() {
                reassign |= e.triangle_count > 0;
                continue;
            }
            match kept.last_mut() {
                Some(prev) if (prev.va, prev.vb) == (e.va, e.vb) => {
                    reassign |= prev.triangle_count > 0 || e.triangle_count > 0;
                    prev.n += e.n;
                    prev.c += e.c;
                    if let Some(count) = counts.last_mut() {
                        *count += 1;
                    }
                }
                _ => {
                    kept.push(e);
                    counts.push(1);
                }
            }
            map[old.index() as usize] = Some(((kept.len() - 1) as u32).into());
        }
        for (e, count) in kept.iter_mut().zip(counts) {
            if count > 1 {
                e.n = (e.n / count as f64).normalize_or_zero();
                e.c /= count as f32;
            }
        }
        self.edges = kept;
        // Triangles touching a dropped edge are collapsed, and go as well.
        let emap = IndexMap::from_entries(map);
        let mut dropped = false;
        let mut triangles = Vec::with_capacity(self.triangles.len());
        for t in self.triangles.iter() {
            let [a, b, c] = t.edges();
            match (emap.get(a)?, emap.get(b)?, emap.get(c)?) {
                (Some(a), Some(b), Some(c)) => {
                    let mut t = *t;
                    t.set_edges([a, b, c]);
                    triangles.push(t);
                }
                _ => dropped = true,
            }
        }
        self.triangles = triangles;
        Ok(reassign || dropped)
    }

    /// Drop collapsed and duplicate triangles. Triangles must be fixed. Returns
    /// true if the triangle slots must be rebuilt. If `reassign` is already
    /// true the triangle slots of the edges are stale and are left alone.
    fn join_triangles(&mut self, mut reassign: bool) -> Result<bool, Error> {
        let mut perm: Vec<TH> = init_permutation(self.triangles.len());
        perm.sort_by_key(|t| self[*t].vertices());
        let mut map: Vec<Option<TH>> = vec![None; self.triangles.len()];
        let mut kept: Vec<Triangle> = Vec::with_capacity(self.triangles.len());
        for old in perm {
            let t = self[old];
            let duplicate = kept
                .last()
                .is_some_and(|prev| prev.vertices() == t.vertices());
            if t.is_collapsed() || duplicate {
                reassign = true;
                continue;
            }
            map[old.index() as usize] = Some((kept.len() as u32).into());
            kept.push(t);
        }
        self.triangles = kept;
        if !reassign {
            self.apply_triangle_map(&IndexMap::from_entries(map), 0)?;
        }
        Ok(reassign)
    }

    /// Recompute the triangle slots and counts of all edges from the triangles.
    /// An edge left with a single triangle takes its orientation from that
    /// triangle.
    pub(crate) fn rebuild_edge_triangles(&mut self) {
        for e in self.edges.iter_mut() {
            e.detach_all();
        }
        for (i, t) in self.triangles.iter().enumerate() {
            let ti: TH = (i as u32).into();
            for e in t.edges() {
                self.edges[e.index() as usize].attach(ti);
            }
        }
        for (i, t) in self.triangles.iter().enumerate() {
            for (side, e) in t.edges().into_iter().enumerate() {
                let edge = &mut self.edges[e.index() as usize];
                if edge.triangle_count == 1 && edge.ta == Some((i as u32).into()) {
                    edge.orient_along(t, side);
                }
            }
        }
    }

    /// Bring a freshly built mesh into its final form: propagate normals,
    /// compute texture coordinate systems, and join.
    ///
    /// This always joins, even if the mesh was joined before. Call it once
    /// after each batch of insertions.
    pub fn finish(&mut self) -> Result<(), Error> {
        self.propagate_normals();
        self.calculate_uv_coordinate_systems();
        self.join()?;
        self.status.set_finished(true);
        log::debug!(
            "Finished mesh with {} vertices, {} edges, {} triangles",
            self.num_vertices(),
            self.num_edges(),
            self.num_triangles()
        );
        Ok(())
    }
}
