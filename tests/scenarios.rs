//! End to end scenarios through the public API.

use glam::{DVec3, dvec3};
use lastmesh::{Mesh, TH, VH, Vertex};

#[test]
fn single_triangle() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Vertex::new(dvec3(0.0, 0.0, 0.0)));
    let b = mesh.add_vertex(Vertex::new(dvec3(1.0, 0.0, 0.0)));
    let c = mesh.add_vertex(Vertex::new(dvec3(0.0, 1.0, 0.0)));
    let t = mesh.add_triangle(a, b, c);
    assert_eq!(mesh.num_vertices(), 3);
    assert_eq!(mesh.num_edges(), 3);
    assert_eq!(mesh.num_triangles(), 1);
    assert!(mesh[t].n.abs_diff_eq(DVec3::Z, 1e-12));
    let u = mesh.add_triangle(a, c, b);
    assert!(mesh[u].n.abs_diff_eq(-DVec3::Z, 1e-12));
}

#[test]
fn quad_shares_its_diagonal() {
    let mut mesh = Mesh::new();
    mesh.add_vertices(&[
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
    ]);
    mesh.add_quad(0.into(), 1.into(), 2.into(), 3.into());
    mesh.finish().expect("Cannot finish");
    assert_eq!(mesh.num_edges(), 5);
    let shared: Vec<_> = mesh
        .edges()
        .filter(|e| mesh[*e].triangle_count == 2)
        .collect();
    assert_eq!(shared.len(), 1);
    let [va, vb] = mesh[shared[0]].vertices();
    // The diagonal joins the corners at the origin and at (1, 1).
    assert_eq!(mesh.point(va), DVec3::ZERO);
    assert_eq!(mesh.point(vb), dvec3(1.0, 1.0, 0.0));
    assert!(mesh.passed_self_check(true, 10));
}

#[test]
fn coincident_vertices_merge() {
    let mut mesh = Mesh::with_epsilon(1e-6);
    mesh.add_vertices(&[
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(1e-9, 0.0, 0.0),
        dvec3(0.0, -1.0, 0.0),
        dvec3(-1.0, 0.0, 0.0),
    ]);
    mesh.add_triangle(0.into(), 1.into(), 2.into());
    mesh.add_triangle(3.into(), 4.into(), 5.into());
    mesh.join().expect("Cannot join");
    assert_eq!(mesh.num_vertices(), 5);
    assert_eq!(mesh.num_triangles(), 2);
    let origin: Vec<VH> = mesh
        .vertices()
        .filter(|v| mesh.point(*v).length() < 1e-6)
        .collect();
    assert_eq!(origin.len(), 1);
    for t in [TH::from(0), TH::from(1)] {
        assert!(mesh[t].vertices().contains(&origin[0]));
    }
}

#[test]
fn cube_cross_section() {
    let mesh = Mesh::unit_box().expect("Cannot create box");
    let mut poly = mesh
        .intersect_plane(DVec3::Z, 0.5)
        .expect("Cannot intersect");
    assert!(poly.is_closed());
    assert!((poly.area() - 1.0).abs() < 1e-12);
    // Join leaves 8 points, where the outline also crosses the diagonal of
    // each side face. Simplify drops those, leaving the 4 corners.
    assert_eq!(poly.num_vertices(), 8);
    assert_eq!(poly.simplify(), 4);
    assert_eq!(poly.num_vertices(), 4);
    assert!((poly.area() - 1.0).abs() < 1e-12);
    let section = poly.triangulate().expect("Cannot triangulate");
    assert_eq!(section.num_triangles(), 2);
    assert!((section.area() - 1.0).abs() < 1e-12);
}

#[test]
fn merged_copies_keep_their_parts() {
    let mut mesh = Mesh::unit_box().expect("Cannot create box");
    let other = Mesh::icosahedron(0.25).expect("Cannot create icosahedron");
    mesh.add_from(&other).expect("Cannot copy");
    mesh.finish().expect("Cannot finish");
    assert_eq!(mesh.num_vertices(), 8 + 12);
    assert_eq!(mesh.num_triangles(), 12 + 20);
    assert_eq!(mesh.calculate_objects(), Ok(2));
    let groups = mesh.calculate_groups(std::f64::consts::PI / 6.0);
    // Six faces of the box, and the icosahedron whose faces meet at about
    // 41.8 degrees.
    assert_eq!(groups.triangles, 6 + 20);
}
