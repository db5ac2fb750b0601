use criterion::{Criterion, criterion_group, criterion_main};
use glam::{DMat4, DVec3, dvec3};
use std::hint::black_box;

use lastmesh::Mesh;

/// The triangles of a sphere as separate, unshared vertices, the way a
/// triangle soup comes out of a file.
fn sphere_soup(slices: u32, stacks: u32) -> Mesh {
    let sphere = Mesh::uv_sphere(DVec3::ZERO, 1.0, slices, stacks).unwrap();
    let mut soup = Mesh::with_capacity(
        3 * sphere.num_triangles(),
        3 * sphere.num_triangles(),
        sphere.num_triangles(),
    );
    for t in sphere.triangles() {
        let points = sphere.triangle_points(t);
        let range = soup.add_vertices(&points);
        let [a, b, c] = [range.start, range.start + 1, range.start + 2];
        soup.add_triangle(a.into(), b.into(), c.into());
    }
    soup
}

fn bench_primitive_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitive_creation");

    group.bench_function("box", |b| {
        b.iter(|| {
            let mesh = Mesh::unit_box().unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("icosahedron", |b| {
        b.iter(|| {
            let mesh = Mesh::icosahedron(black_box(1.0)).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("uv_sphere_64x32", |b| {
        b.iter(|| {
            let mesh = Mesh::uv_sphere(DVec3::ZERO, 1.0, black_box(64), black_box(32)).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("height_grid_100x100", |b| {
        b.iter(|| {
            let mesh = Mesh::height_grid(black_box(100), black_box(100), |i, j| {
                ((i as f64) * 0.1).sin() * ((j as f64) * 0.1).cos()
            })
            .unwrap();
            black_box(mesh);
        });
    });

    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");

    let soup = sphere_soup(64, 32);
    group.bench_function("join_soup", |b| {
        b.iter(|| {
            let mut mesh = soup.clone();
            mesh.join().unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("finish_soup", |b| {
        b.iter(|| {
            let mut mesh = soup.clone();
            mesh.finish().unwrap();
            black_box(mesh);
        });
    });

    let sphere = Mesh::uv_sphere(DVec3::ZERO, 1.0, 64, 32).unwrap();
    group.bench_function("sort_finished", |b| {
        b.iter(|| {
            let mut mesh = sphere.clone();
            mesh.sort().unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("self_check", |b| {
        b.iter(|| {
            black_box(sphere.passed_self_check(true, 10));
        });
    });

    group.finish();
}

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operations");

    let sphere = Mesh::uv_sphere(DVec3::ZERO, 1.0, 64, 32).unwrap();

    group.bench_function("calculate_normals", |b| {
        b.iter(|| {
            let mut mesh = sphere.clone();
            mesh.calculate_normals();
            black_box(mesh);
        });
    });

    group.bench_function("calculate_groups", |b| {
        b.iter(|| {
            let mut mesh = sphere.clone();
            let groups = mesh.calculate_groups(black_box(0.5));
            black_box(groups);
        });
    });

    let mut parts = sphere.clone();
    for i in 1..8 {
        let mut copy = sphere.clone();
        copy.transform(DMat4::from_translation(dvec3(3.0 * i as f64, 0.0, 0.0)));
        parts.add_from(&copy).unwrap();
    }
    parts.finish().unwrap();
    group.bench_function("calculate_objects", |b| {
        b.iter(|| {
            let mut mesh = parts.clone();
            let count = mesh.calculate_objects().unwrap();
            black_box(count);
        });
    });

    group.bench_function("intersect_plane", |b| {
        b.iter(|| {
            let poly = sphere
                .intersect_plane(black_box(dvec3(0.3, 0.4, 0.5).normalize()), black_box(0.2))
                .unwrap();
            black_box(poly);
        });
    });

    group.bench_function("transform", |b| {
        b.iter(|| {
            let mut mesh = sphere.clone();
            mesh.transform(black_box(DMat4::from_rotation_z(0.3)));
            black_box(mesh);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_primitive_creation,
    bench_canonical,
    bench_operations
);
criterion_main!(benches);
