/*!
Index maps used to renumber elements.

Every reordering of the element arrays (sorting, merging, copying from
another mesh) is expressed as an [`IndexMap`] from old indices to new ones,
which is then applied to every reference held by the other arrays.
*/

use crate::{
    element::{EH, Handle, TH, VH},
    error::Error,
    mesh::Mesh,
};

/// Map from old element indices to new ones. An entry of `None` means the old
/// element has no counterpart, either because it was dropped or because it
/// was never copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap<H: Handle> {
    map: Vec<Option<H>>,
}

impl<H: Handle> Default for IndexMap<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle> IndexMap<H> {
    pub fn new() -> Self {
        IndexMap { map: Vec::new() }
    }

    /// The map taking every index to itself.
    pub fn identity(n: usize) -> Self {
        IndexMap {
            map: (0..n as u32).map(|i| Some(i.into())).collect(),
        }
    }

    /// Invert a permutation: `perm[new] == old` becomes `map[old] == new`.
    pub fn from_permutation(perm: &[H]) -> Self {
        let mut map = vec![None; perm.len()];
        for (new, old) in perm.iter().enumerate() {
            map[old.index() as usize] = Some((new as u32).into());
        }
        IndexMap { map }
    }

    pub(crate) fn from_entries(map: Vec<Option<H>>) -> Self {
        IndexMap { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// Record that `src` maps to `dst`, growing the map with empty entries as
    /// needed.
    pub fn set(&mut self, src: usize, dst: H) {
        if src >= self.map.len() {
            self.map.resize(src + 1, None);
        }
        self.map[src] = Some(dst);
    }

    /// Look up `src`. An index beyond the end of the map is an error, an
    /// unmapped entry is `Ok(None)`.
    pub fn get(&self, src: H) -> Result<Option<H>, Error> {
        self.map
            .get(src.index() as usize)
            .copied()
            .ok_or(Error::out_of_range(src, self.map.len()))
    }

    /// Look up `src` and require it to be mapped.
    pub fn apply(&self, src: H) -> Result<H, Error> {
        self.get(src)?.ok_or(Error::UnmappedIndex {
            kind: H::KIND,
            index: src.index() as usize,
        })
    }

    /// Map an optional reference. Unmapped entries become `None`.
    pub fn apply_opt(&self, src: Option<H>) -> Result<Option<H>, Error> {
        match src {
            Some(h) => self.get(h),
            None => Ok(None),
        }
    }
}

/// Identity permutation over `n` elements, to be sorted and then inverted with
/// [`IndexMap::from_permutation`].
pub(crate) fn init_permutation<H: Handle>(n: usize) -> Vec<H> {
    (0..n as u32).map(|i| i.into()).collect()
}

/// Reorder `items` so that `out[new] = items[perm[new]]`.
pub(crate) fn permute<T: Copy, H: Handle>(items: &[T], perm: &[H]) -> Vec<T> {
    perm.iter().map(|old| items[old.index() as usize]).collect()
}

/// The vertex, edge and triangle maps of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Maps {
    pub vmap: IndexMap<VH>,
    pub emap: IndexMap<EH>,
    pub tmap: IndexMap<TH>,
}

impl Maps {
    pub fn is_empty(&self) -> bool {
        self.vmap.is_empty() && self.emap.is_empty() && self.tmap.is_empty()
    }
}

impl Mesh {
    /// The maps recorded by insertions with a source index, waiting to be
    /// consumed by [`Mesh::remap`].
    pub fn maps(&self) -> &Maps {
        &self.maps
    }

    /// Translate the references held by the edges from `estart` and the
    /// triangles from `tstart` through the recorded maps. Each non-empty map
    /// is applied and all maps are consumed, whether or not this succeeds.
    ///
    /// Vertex references of edges and triangles go through the vertex map,
    /// edge references of triangles through the edge map, and the triangle
    /// slots of edges through the triangle map. Triangle counts of remapped
    /// edges are recomputed from the surviving slots.
    pub fn remap(&mut self, estart: usize, tstart: usize) -> Result<(), Error> {
        let maps = std::mem::take(&mut self.maps);
        self.apply_maps(maps, estart, tstart)
    }

    /// Same as [`Mesh::remap`] with explicitly provided maps.
    pub fn apply_maps(&mut self, maps: Maps, estart: usize, tstart: usize) -> Result<(), Error> {
        let Maps { vmap, emap, tmap } = maps;
        if !vmap.is_empty() {
            self.apply_vertex_map(&vmap, estart, tstart)?;
        }
        if !emap.is_empty() {
            self.apply_edge_map(&emap, tstart)?;
        }
        if !tmap.is_empty() {
            self.apply_triangle_map(&tmap, estart)?;
        }
        Ok(())
    }

    pub(crate) fn apply_vertex_map(
        &mut self,
        vmap: &IndexMap<VH>,
        estart: usize,
        tstart: usize,
    ) -> Result<(), Error> {
        for e in self.edges.iter_mut().skip(estart) {
            e.va = vmap.apply(e.va)?;
            e.vb = vmap.apply(e.vb)?;
        }
        for t in self.triangles.iter_mut().skip(tstart) {
            let [a, b, c] = t.vertices();
            t.set_vertices([vmap.apply(a)?, vmap.apply(b)?, vmap.apply(c)?]);
        }
        Ok(())
    }

    pub(crate) fn apply_edge_map(&mut self, emap: &IndexMap<EH>, tstart: usize) -> Result<(), Error> {
        for t in self.triangles.iter_mut().skip(tstart) {
            let [a, b, c] = t.edges();
            t.set_edges([emap.apply(a)?, emap.apply(b)?, emap.apply(c)?]);
        }
        Ok(())
    }

    pub(crate) fn apply_triangle_map(
        &mut self,
        tmap: &IndexMap<TH>,
        estart: usize,
    ) -> Result<(), Error> {
        let mut orphaned = Vec::new();
        for (i, e) in self.edges.iter_mut().enumerate().skip(estart) {
            let ta = tmap.apply_opt(e.ta)?;
            let tb = tmap.apply_opt(e.tb)?;
            let (ta, tb) = match (ta, tb) {
                (None, Some(t)) => (Some(t), None),
                other => other,
            };
            let count = match (ta, tb) {
                (Some(_), Some(_)) => e.triangle_count.max(2),
                (Some(_), None) => 1,
                _ => 0,
            };
            if count == 1 && e.triangle_count > 1 {
                orphaned.push(i);
            }
            e.triangle_count = count;
            e.ta = ta;
            e.tb = tb;
        }
        // An edge that lost all but one triangle follows that triangle.
        for i in orphaned {
            let eh: EH = (i as u32).into();
            let slot = self.edges[i].ta;
            let Some(t) = slot.and_then(|t| self.triangles.get(t.index() as usize).copied()) else {
                continue;
            };
            if let Some(side) = t.side_of(eh) {
                self.edges[i].orient_along(&t, side);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{IndexMap, init_permutation, permute};
    use crate::{
        element::{Handle, VH},
        error::Error,
    };

    #[test]
    fn t_permutation_roundtrip() {
        let items = [30, 10, 20];
        let mut perm: Vec<VH> = init_permutation(items.len());
        perm.sort_by_key(|v| items[v.index() as usize]);
        assert_eq!(permute(&items, &perm), vec![10, 20, 30]);
        let map = IndexMap::from_permutation(&perm);
        // Old index 0 (value 30) is now last.
        assert_eq!(map.apply(0.into()), Ok(2.into()));
        assert_eq!(map.apply(1.into()), Ok(0.into()));
        assert_eq!(map.apply(2.into()), Ok(1.into()));
    }

    #[test]
    fn t_set_grows_with_empty_entries() {
        let mut map = IndexMap::<VH>::new();
        map.set(3, 0.into());
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(1.into()), Ok(None));
        assert_eq!(map.get(3.into()), Ok(Some(0.into())));
        assert!(matches!(
            map.apply(1.into()),
            Err(Error::UnmappedIndex { index: 1, .. })
        ));
        assert!(matches!(
            map.get(4.into()),
            Err(Error::IndexOutOfRange { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn t_identity() {
        let map = IndexMap::<VH>::identity(5);
        for i in 0..5u32 {
            assert_eq!(map.apply(i.into()), Ok(i.into()));
        }
        assert_eq!(map.apply_opt(None), Ok(None));
    }
}
