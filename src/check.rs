use std::fmt::Arguments;

use crate::{
    element::{Handle, TH, VH},
    mesh::Mesh,
};

/// Number of problems found by [`Mesh::check`], per category.
///
/// Counts stop growing once a category exceeds the limit passed to the check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfCheck {
    /// References pointing past the end of their array.
    pub range: usize,
    /// Edges whose triangle slots disagree with their triangle count.
    pub triangle_count: usize,
    /// Non-empty maps whose size does not match their array.
    pub map_size: usize,
    /// Selected vertices that do not exist.
    pub selection: usize,
    /// Canonical ordering violations. Only checked on request.
    pub well_ordering: usize,
    /// Triangles and edges that do not agree on their adjacency. Only checked
    /// when every other category is clean.
    pub consistency: usize,
}

impl SelfCheck {
    pub fn passed(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.range
            + self.triangle_count
            + self.map_size
            + self.selection
            + self.well_ordering
            + self.consistency
    }
}

struct Category {
    name: &'static str,
    errors: usize,
    max: usize,
}

impl Category {
    fn new(name: &'static str, max: usize) -> Self {
        Category {
            name,
            errors: 0,
            max,
        }
    }

    fn full(&self) -> bool {
        self.errors > self.max
    }

    fn fail(&mut self, args: Arguments) {
        if self.errors < self.max {
            log::error!("Self check, {}: {}", self.name, args);
        } else if self.errors == self.max {
            log::error!("Self check, {}: ...", self.name);
        }
        self.errors += 1;
    }
}

fn check_range(mesh: &Mesh, cat: &mut Category) {
    let (nv, ne, nt) = (
        mesh.vertices.len() as u32,
        mesh.edges.len() as u32,
        mesh.triangles.len() as u32,
    );
    for (i, e) in mesh.edges.iter().enumerate() {
        if cat.full() {
            return;
        }
        for v in e.vertices() {
            if v.index() >= nv {
                cat.fail(format_args!("Edge {} references {} of {}", i, v, nv));
            }
        }
        for t in e.triangles() {
            if t.index() >= nt {
                cat.fail(format_args!("Edge {} references {} of {}", i, t, nt));
            }
        }
    }
    for (i, t) in mesh.triangles.iter().enumerate() {
        if cat.full() {
            return;
        }
        for v in t.vertices() {
            if v.index() >= nv {
                cat.fail(format_args!("Triangle {} references {} of {}", i, v, nv));
            }
        }
        for e in t.edges() {
            if e.index() >= ne {
                cat.fail(format_args!("Triangle {} references {} of {}", i, e, ne));
            }
        }
    }
}

fn check_triangle_count(mesh: &Mesh, cat: &mut Category) {
    for (i, e) in mesh.edges.iter().enumerate() {
        if cat.full() {
            return;
        }
        let ok = match e.triangle_count {
            0 => e.ta.is_none() && e.tb.is_none(),
            1 => e.ta.is_some() && e.tb.is_none(),
            _ => e.ta.is_some() && e.tb.is_some(),
        };
        if !ok {
            cat.fail(format_args!(
                "Edge {} has count {} with slots {:?} {:?}",
                i, e.triangle_count, e.ta, e.tb
            ));
        }
    }
}

fn check_map_size(mesh: &Mesh, cat: &mut Category) {
    for (name, len, expected) in [
        ("vertex", mesh.maps.vmap.len(), mesh.vertices.len()),
        ("edge", mesh.maps.emap.len(), mesh.edges.len()),
        ("triangle", mesh.maps.tmap.len(), mesh.triangles.len()),
    ] {
        if len > 0 && len != expected {
            cat.fail(format_args!(
                "The {} map has {} entries for {} elements",
                name, len, expected
            ));
        }
    }
}

fn check_selection(mesh: &Mesh, cat: &mut Category) {
    let nv = mesh.vertices.len() as u32;
    for v in mesh.selection.range(VH::from(nv)..) {
        if cat.full() {
            return;
        }
        cat.fail(format_args!("Selected {} of {}", v, nv));
    }
}

fn check_well_ordering(mesh: &Mesh, cat: &mut Category) {
    for (i, e) in mesh.edges.iter().enumerate() {
        if cat.full() {
            return;
        }
        if e.va >= e.vb {
            cat.fail(format_args!("Edge {} has vertices {} {}", i, e.va, e.vb));
        }
        if let (2.., Some(ta), Some(tb)) = (e.triangle_count, e.ta, e.tb) {
            if ta >= tb {
                cat.fail(format_args!("Edge {} has triangles {} {}", i, ta, tb));
            }
        }
    }
    for (i, t) in mesh.triangles.iter().enumerate() {
        if cat.full() {
            return;
        }
        if !(t.va < t.vb && t.vb < t.vc) {
            cat.fail(format_args!(
                "Triangle {} has vertices {} {} {}",
                i, t.va, t.vb, t.vc
            ));
        }
        if !(t.ea < t.eb && t.ec < t.eb && t.ea < t.ec) {
            cat.fail(format_args!(
                "Triangle {} has edges {} {} {}",
                i, t.ea, t.eb, t.ec
            ));
        }
        // The side (vc, va) is stored as (va, vc), against the winding of the
        // triangle, so its edge must have the opposite flip.
        for (side, e) in t.edges().into_iter().enumerate() {
            let edge = &mesh.edges[e.index() as usize];
            if edge.triangle_count > 1 {
                continue;
            }
            let expected = if side == 2 { !t.flip } else { t.flip };
            if edge.flip != expected {
                cat.fail(format_args!(
                    "Triangle {} has flip {} but its side {} edge {} has flip {}",
                    i, t.flip, side, e, edge.flip
                ));
            }
        }
    }
}

fn check_consistency(mesh: &Mesh, cat: &mut Category) {
    for (i, t) in mesh.triangles.iter().enumerate() {
        if cat.full() {
            return;
        }
        let th: TH = (i as u32).into();
        for (side, e) in t.edges().into_iter().enumerate() {
            let edge = &mesh.edges[e.index() as usize];
            let (a, b) = t.side_vertices(side);
            if !edge.connects(a, b) {
                cat.fail(format_args!(
                    "Edge {} on side {} of {} does not connect {} and {}",
                    e, side, th, a, b
                ));
            }
            for other in edge.triangles() {
                if mesh.triangles[other.index() as usize].side_of(e).is_none() {
                    cat.fail(format_args!(
                        "Edge {} of {} lists {} which does not contain it",
                        e, th, other
                    ));
                }
            }
        }
    }
}

impl Mesh {
    /// Check the structural invariants of the mesh, by looking only at the
    /// stored fields.
    ///
    /// Every problem is logged as an error, at most `max_per_type` per
    /// category. This never fails, so it can be run on meshes that are known to
    /// be broken, e.g. halfway through construction.
    pub fn check(&self, well_ordering: bool, max_per_type: usize) -> SelfCheck {
        let mut range = Category::new("range", max_per_type);
        let mut count = Category::new("triangle count", max_per_type);
        let mut maps = Category::new("map size", max_per_type);
        let mut selection = Category::new("selection", max_per_type);
        let mut ordering = Category::new("well ordering", max_per_type);
        let mut consistency = Category::new("consistency", max_per_type);
        check_range(self, &mut range);
        check_triangle_count(self, &mut count);
        check_map_size(self, &mut maps);
        check_selection(self, &mut selection);
        // The remaining checks index the arrays directly.
        if range.errors == 0 {
            if well_ordering {
                check_well_ordering(self, &mut ordering);
            }
            if count.errors + maps.errors + selection.errors + ordering.errors == 0 {
                check_consistency(self, &mut consistency);
            }
        }
        let report = SelfCheck {
            range: range.errors,
            triangle_count: count.errors,
            map_size: maps.errors,
            selection: selection.errors,
            well_ordering: ordering.errors,
            consistency: consistency.errors,
        };
        if !report.passed() {
            log::warn!("Self check failed: {:?}", report);
        }
        report
    }

    /// Same as [`Mesh::check`], reduced to a yes or no.
    pub fn passed_self_check(&self, well_ordering: bool, max_per_type: usize) -> bool {
        self.check(well_ordering, max_per_type).passed()
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use crate::{
        element::{EH, TH, VH},
        mesh::Mesh,
    };

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertices(&[
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        ]);
        mesh.add_quad(0.into(), 1.into(), 2.into(), 3.into());
        mesh
    }

    #[test]
    fn t_raw_mesh_is_consistent_but_not_ordered() {
        let mut mesh = quad();
        assert!(mesh.passed_self_check(false, 10));
        // The second triangle is (0, 2, 3), whose side (3, 0) is not ordered.
        let report = mesh.check(true, 10);
        assert!(report.well_ordering > 0);
        assert_eq!(report.consistency, 0);
        mesh.finish().expect("Cannot finish");
        assert!(mesh.passed_self_check(true, 10));
    }

    #[test]
    fn t_range() {
        let mut mesh = quad();
        mesh[TH::from(1)].vc = VH::from(17);
        let report = mesh.check(false, 10);
        assert_eq!(report.range, 1);
        // Deep checks are skipped when references are out of range.
        assert_eq!(report.consistency, 0);
        assert!(!report.passed());
    }

    #[test]
    fn t_triangle_count() {
        let mut mesh = quad();
        mesh[EH::from(0)].triangle_count = 2;
        let report = mesh.check(false, 10);
        assert_eq!(report.triangle_count, 1);
        mesh[EH::from(0)].triangle_count = 0;
        assert_eq!(mesh.check(false, 10).triangle_count, 1);
    }

    #[test]
    fn t_stale_map() {
        let mut mesh = quad();
        mesh.add_vertex_mapped(crate::element::Vertex::default(), 7);
        let report = mesh.check(false, 10);
        assert_eq!(report.map_size, 1);
        // Nothing was copied, so the map only needs to be consumed.
        let (ne, nt) = (mesh.num_edges(), mesh.num_triangles());
        mesh.remap(ne, nt).expect("Cannot remap");
        assert!(mesh.passed_self_check(false, 10));
    }

    #[test]
    fn t_selection_out_of_range() {
        let mut mesh = quad();
        mesh.select_vertex(3.into()).expect("Cannot select");
        mesh.vertices.truncate(3);
        mesh.triangles.clear();
        mesh.edges.clear();
        assert_eq!(mesh.check(false, 10).selection, 1);
    }

    #[test]
    fn t_inconsistent_adjacency() {
        let mut mesh = quad();
        mesh.finish().expect("Cannot finish");
        let t = mesh[TH::from(0)];
        // Point a side at an edge that joins other vertices.
        let wrong = mesh
            .edges()
            .find(|e| !t.edges().contains(e))
            .expect("Quad must have an edge outside the first triangle");
        mesh[TH::from(0)].ea = wrong;
        let report = mesh.check(false, 10);
        assert!(report.consistency > 0);
    }

    #[test]
    fn t_errors_are_capped() {
        let mut mesh = Mesh::new();
        for i in 0..20 {
            let e = mesh.add_edge(crate::element::Edge::new(0.into(), 1.into()));
            mesh[e].triangle_count = i + 1;
        }
        let report = mesh.check(false, 3);
        // Range errors on both ends of the first few edges, then stop.
        assert!(report.range <= 5);
        assert_eq!(report.triangle_count, 4);
    }
}
