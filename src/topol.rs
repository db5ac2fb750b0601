/*!
Connectivity of the mesh: sharp edges, smooth triangle groups, chains of
sharp edges, and connected objects.
*/

use std::collections::VecDeque;

use crate::{
    element::{EH, Handle, TH, VH},
    error::Error,
    mesh::Mesh,
};

/// Number of groups found by [`Mesh::calculate_groups`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Groups {
    /// Sets of triangles connected across smooth edges.
    pub triangles: usize,
    /// Chains of sharp edges.
    pub edges: usize,
}

/// Disjoint sets over vertex indices. The root of every set is its smallest
/// member.
struct DisjointSets {
    parent: Vec<u32>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        DisjointSets {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, mut i: u32) -> u32 {
        while self.parent[i as usize] != i {
            let grand = self.parent[self.parent[i as usize] as usize];
            self.parent[i as usize] = grand;
            i = grand;
        }
        i
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else if rb < ra {
            self.parent[ra as usize] = rb;
        }
    }
}

impl Mesh {
    /// Mark the edges that border fewer than two triangles, or two triangles
    /// whose normals differ by more than `angle` radians. Returns the number of
    /// sharp edges.
    pub fn calculate_sharp_edges(&mut self, angle: f64) -> usize {
        let threshold = angle.cos();
        let mut count = 0;
        for e in self.edges.iter_mut() {
            e.sharp = match (e.triangle_count, e.ta, e.tb) {
                (2.., Some(ta), Some(tb)) => {
                    let na = self.triangles[ta.index() as usize].n;
                    let nb = self.triangles[tb.index() as usize].n;
                    na.dot(nb) < threshold
                }
                _ => true,
            };
            count += e.sharp as usize;
        }
        count
    }

    /// Mark sharp edges with the given angle, then group the triangles that
    /// are connected across smooth edges, and the sharp edges that form
    /// chains. A chain continues through every vertex touched by exactly two
    /// sharp edges, and ends at vertices where sharp edges branch or stop.
    ///
    /// Smooth edges are left without a group. Requires triangle normals.
    pub fn calculate_groups(&mut self, angle: f64) -> Groups {
        let nsharp = self.calculate_sharp_edges(angle);
        let groups = Groups {
            triangles: self.group_triangles(),
            edges: self.group_sharp_edges(),
        };
        log::debug!(
            "Found {} sharp edges, {} triangle groups and {} edge chains",
            nsharp,
            groups.triangles,
            groups.edges
        );
        groups
    }

    fn group_triangles(&mut self) -> usize {
        for t in self.triangles.iter_mut() {
            t.group = None;
        }
        let mut queue = VecDeque::new();
        let mut ngroups = 0u32;
        for seed in 0..self.triangles.len() {
            if self.triangles[seed].group.is_some() {
                continue;
            }
            self.triangles[seed].group = Some(ngroups);
            queue.push_back(TH::from(seed as u32));
            while let Some(t) = queue.pop_front() {
                let edges = self[t].edges();
                for e in edges {
                    let edge = &self.edges[e.index() as usize];
                    if edge.sharp || edge.triangle_count < 2 {
                        continue;
                    }
                    for other in edge.triangles() {
                        let tri = &mut self.triangles[other.index() as usize];
                        if tri.group.is_none() {
                            tri.group = Some(ngroups);
                            queue.push_back(other);
                        }
                    }
                }
            }
            ngroups += 1;
        }
        ngroups as usize
    }

    fn group_sharp_edges(&mut self) -> usize {
        let mut incident: Vec<Vec<EH>> = vec![Vec::new(); self.vertices.len()];
        for (i, e) in self.edges.iter_mut().enumerate() {
            e.group = None;
            if e.sharp {
                incident[e.va.index() as usize].push((i as u32).into());
                incident[e.vb.index() as usize].push((i as u32).into());
            }
        }
        let mut ngroups = 0u32;
        for seed in self.edges() {
            if !self[seed].sharp || self[seed].group.is_some() {
                continue;
            }
            self[seed].group = Some(ngroups);
            let [va, vb] = self[seed].vertices();
            for start in [vb, va] {
                self.walk_chain(seed, start, ngroups, &incident);
            }
            ngroups += 1;
        }
        ngroups as usize
    }

    /// Extend the chain containing `from` through `v`, until it branches, ends
    /// or closes on itself.
    fn walk_chain(&mut self, from: EH, v: VH, group: u32, incident: &[Vec<EH>]) {
        let (mut e, mut v) = (from, v);
        loop {
            let &[a, b] = incident[v.index() as usize].as_slice() else {
                return;
            };
            let next = if a == e { b } else { a };
            let edge = &mut self[next];
            if edge.group.is_some() {
                return;
            }
            edge.group = Some(group);
            v = edge.other_vertex(v);
            e = next;
        }
    }

    /// Label the connected parts of the mesh. Every vertex gets the group of
    /// its part, numbered in order of the lowest vertex of each part, and edges
    /// and triangles take the group of their first vertex. Returns the number
    /// of parts.
    ///
    /// The mesh must pass the self check.
    pub fn calculate_objects(&mut self) -> Result<usize, Error> {
        if !self.passed_self_check(false, 10) {
            return Err(Error::SelfCheckFailed);
        }
        let mut sets = DisjointSets::new(self.vertices.len());
        for e in self.edges.iter() {
            sets.union(e.va.index(), e.vb.index());
        }
        let mut labels: Vec<Option<u32>> = vec![None; self.vertices.len()];
        let mut count = 0u32;
        for i in 0..self.vertices.len() {
            let root = sets.find(i as u32) as usize;
            // The root is the smallest member, so it is labelled first.
            let label = *labels[root].get_or_insert_with(|| {
                count += 1;
                count - 1
            });
            labels[i] = Some(label);
            self.vertices[i].group = Some(label);
        }
        for e in self.edges.iter_mut() {
            e.group = self.vertices[e.va.index() as usize].group;
        }
        for t in self.triangles.iter_mut() {
            t.group = self.vertices[t.va.index() as usize].group;
        }
        log::debug!("Found {} objects", count);
        Ok(count as usize)
    }
}

#[cfg(test)]
mod test {
    use glam::{DMat4, DVec3, dvec3};

    use crate::{
        element::{Edge, Vertex},
        error::Error,
        mesh::Mesh,
        topol::Groups,
    };

    const THIRTY_DEGREES: f64 = std::f64::consts::PI / 6.0;

    #[test]
    fn t_box_groups() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        assert_eq!(mesh.calculate_sharp_edges(THIRTY_DEGREES), 12);
        let groups = mesh.calculate_groups(THIRTY_DEGREES);
        // Every corner has three sharp edges, so each edge is its own chain.
        assert_eq!(
            groups,
            Groups {
                triangles: 6,
                edges: 12
            }
        );
        for e in mesh.edges() {
            assert_eq!(mesh[e].group.is_some(), mesh[e].sharp);
        }
        // Both triangles of a face share a group, and it is the face's own.
        for t in mesh.triangles() {
            let n = mesh[t].n;
            for u in mesh.triangles() {
                let same_face = mesh[u].n.dot(n) > 0.99;
                assert_eq!(same_face, mesh[t].group == mesh[u].group);
            }
        }
    }

    #[test]
    fn t_grid_boundary_is_one_chain() {
        let mut mesh = Mesh::height_grid(3, 2, |_, _| 0.0).expect("Cannot create grid");
        let groups = mesh.calculate_groups(THIRTY_DEGREES);
        assert_eq!(
            groups,
            Groups {
                triangles: 1,
                edges: 1
            }
        );
        let boundary = mesh.edges().filter(|e| mesh[*e].group == Some(0)).count();
        assert_eq!(boundary, 10);
    }

    #[test]
    fn t_sphere_is_smooth() {
        let mut mesh = Mesh::uv_sphere(DVec3::ZERO, 1.0, 24, 12).expect("Cannot create sphere");
        assert_eq!(mesh.calculate_sharp_edges(THIRTY_DEGREES), 0);
        assert_eq!(mesh.calculate_groups(THIRTY_DEGREES).triangles, 1);
    }

    #[test]
    fn t_objects() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        let mut other = Mesh::tetrahedron(0.5).expect("Cannot create tetrahedron");
        other.transform(DMat4::from_translation(dvec3(5.0, 0.0, 0.0)));
        mesh.add_from(&other).expect("Cannot copy");
        mesh.add_vertex(Vertex::new(dvec3(-3.0, 0.0, 0.0)));
        let a = mesh.add_vertex(Vertex::new(dvec3(-4.0, 0.0, 0.0)));
        let b = mesh.add_vertex(Vertex::new(dvec3(-5.0, 0.0, 0.0)));
        mesh.add_edge(Edge::new(a, b));
        mesh.finish().expect("Cannot finish");
        assert_eq!(mesh.calculate_objects(), Ok(4));
        // Numbered in order of the lowest vertex, which is the sorted order.
        let first = mesh.vertices().next().expect("Mesh has vertices");
        assert_eq!(mesh[first].group, Some(0));
        for e in mesh.edges() {
            let [va, vb] = mesh[e].vertices();
            assert_eq!(mesh[va].group, mesh[vb].group);
            assert_eq!(mesh[e].group, mesh[va].group);
        }
        for t in mesh.triangles() {
            assert!(mesh[t].vertices().iter().all(|v| mesh[*v].group == mesh[t].group));
        }
        let mut sizes = vec![0; 4];
        for v in mesh.vertices() {
            sizes[mesh[v].group.expect("Every vertex has a group") as usize] += 1;
        }
        sizes.sort();
        assert_eq!(sizes, vec![1, 2, 4, 8]);
    }

    #[test]
    fn t_objects_require_consistent_mesh() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        mesh.edges[0].triangle_count = 0;
        assert_eq!(mesh.calculate_objects(), Err(Error::SelfCheckFailed));
    }
}
