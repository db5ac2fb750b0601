use std::f64::consts::{PI, TAU};

use glam::{DVec3, dvec3};

use crate::{element::VH, error::Error, mesh::Mesh};

impl Mesh {
    /// Makes a box split into triangles, spanning from the min point to the max
    /// point. Each face is added as a quad with the following vertex numbering.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn tri_box(min: DVec3, max: DVec3) -> Result<Self, Error> {
        const CORNERS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const FACES: [[u32; 4]; 6] = [
            [0, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
            [4, 5, 6, 7],
        ];
        let mut mesh = Self::with_capacity(8, 30, 12);
        let pick = |flag: bool, lo: f64, hi: f64| if flag { hi } else { lo };
        let corners = CORNERS.map(|(x, y, z)| {
            dvec3(
                pick(x, min.x, max.x),
                pick(y, min.y, max.y),
                pick(z, min.z, max.z),
            )
        });
        mesh.add_vertices(&corners);
        for [a, b, c, d] in FACES {
            mesh.add_quad(a.into(), b.into(), c.into(), d.into());
        }
        mesh.finish()?;
        Ok(mesh)
    }

    /// Box of size 1, spanning from the origin to (1, 1, 1).
    pub fn unit_box() -> Result<Self, Error> {
        Self::tri_box(DVec3::ZERO, DVec3::ONE)
    }

    /// Tetrahedron centered at the origin, with its vertices on the sphere of
    /// the given radius.
    pub fn tetrahedron(radius: f64) -> Result<Self, Error> {
        let a = radius / 3.0;
        let b = radius * (8.0f64 / 9.0).sqrt();
        let c = radius * (2.0f64 / 9.0).sqrt();
        let d = radius * (2.0f64 / 3.0).sqrt();
        let mut mesh = Self::with_capacity(4, 12, 4);
        mesh.add_vertices(&[
            dvec3(0.0, 0.0, radius),
            dvec3(-c, d, -a),
            dvec3(-c, -d, -a),
            dvec3(b, 0.0, -a),
        ]);
        for [x, y, z] in [[0u32, 1, 2], [0, 2, 3], [0, 3, 1], [3, 2, 1]] {
            mesh.add_triangle(x.into(), y.into(), z.into());
        }
        mesh.finish()?;
        Ok(mesh)
    }

    /// Icosahedron centered at the origin, with its vertices on the sphere of
    /// the given radius.
    pub fn icosahedron(radius: f64) -> Result<Self, Error> {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        let mut points = Vec::with_capacity(12);
        for s in [-1.0, 1.0] {
            for t in [-1.0, 1.0] {
                points.push(dvec3(0.0, s, t * phi));
                points.push(dvec3(s, t * phi, 0.0));
                points.push(dvec3(t * phi, 0.0, s));
            }
        }
        let points: Vec<DVec3> = points.iter().map(|p| p.normalize() * radius).collect();
        // Faces are the triples of mutually adjacent vertices, and adjacent
        // vertices are the ones at the shortest distance.
        let edge = points[1..]
            .iter()
            .map(|p| p.distance(points[0]))
            .fold(f64::MAX, f64::min);
        let adjacent = |i: usize, j: usize| (points[i].distance(points[j]) - edge).abs() < 1e-9 * radius;
        let mut mesh = Self::with_capacity(12, 60, 20);
        mesh.add_vertices(&points);
        for i in 0..12 {
            for j in (i + 1)..12 {
                if !adjacent(i, j) {
                    continue;
                }
                for k in (j + 1)..12 {
                    if !adjacent(i, k) || !adjacent(j, k) {
                        continue;
                    }
                    let (a, b, c) = (points[i], points[j], points[k]);
                    let outward = (b - a).cross(c - a).dot(a + b + c) > 0.0;
                    let [i, j, k] = [i, j, k].map(|x| VH::from(x as u32));
                    if outward {
                        mesh.add_triangle(i, j, k);
                    } else {
                        mesh.add_triangle(i, k, j);
                    }
                }
            }
        }
        mesh.finish()?;
        Ok(mesh)
    }

    /// Sphere made of `slices` segments around the z axis and `stacks` rings
    /// from pole to pole, with triangle fans at the poles.
    pub fn uv_sphere(center: DVec3, radius: f64, slices: u32, stacks: u32) -> Result<Self, Error> {
        let slices = slices.max(3);
        let stacks = stacks.max(2);
        let nrings = stacks - 1;
        let mut mesh = Self::with_capacity(
            (nrings * slices + 2) as usize,
            (6 * nrings * slices) as usize,
            (2 * nrings * slices) as usize,
        );
        let north = mesh.add_vertices(&[center + DVec3::Z * radius]).start;
        for i in 1..stacks {
            let polar = PI * i as f64 / stacks as f64;
            let ring: Vec<DVec3> = (0..slices)
                .map(|j| {
                    let azimuth = TAU * j as f64 / slices as f64;
                    center
                        + radius
                            * dvec3(
                                polar.sin() * azimuth.cos(),
                                polar.sin() * azimuth.sin(),
                                polar.cos(),
                            )
                })
                .collect();
            mesh.add_vertices(&ring);
        }
        let south = mesh.add_vertices(&[center - DVec3::Z * radius]).start;
        let ring = |i: u32, j: u32| -> VH { (north + 1 + i * slices + j % slices).into() };
        for j in 0..slices {
            mesh.add_triangle(north.into(), ring(0, j), ring(0, j + 1));
            for i in 0..(nrings - 1) {
                mesh.add_quad(ring(i, j), ring(i + 1, j), ring(i + 1, j + 1), ring(i, j + 1));
            }
            mesh.add_triangle(south.into(), ring(nrings - 1, j + 1), ring(nrings - 1, j));
        }
        mesh.finish()?;
        Ok(mesh)
    }

    /// Open grid of `nx` by `ny` unit squares in the xy plane, with the height
    /// of the vertex at column `i` and row `j` given by `height(i, j)`.
    pub fn height_grid<F>(nx: u32, ny: u32, height: F) -> Result<Self, Error>
    where
        F: Fn(u32, u32) -> f64,
    {
        let mut mesh = Self::with_capacity(
            ((nx + 1) * (ny + 1)) as usize,
            (6 * nx * ny) as usize,
            (2 * nx * ny) as usize,
        );
        let positions: Vec<DVec3> = (0..=ny)
            .flat_map(|j| (0..=nx).map(move |i| (i, j)))
            .map(|(i, j)| dvec3(i as f64, j as f64, height(i, j)))
            .collect();
        mesh.add_vertices(&positions);
        let vert = |i: u32, j: u32| -> VH { (j * (nx + 1) + i).into() };
        for j in 0..ny {
            for i in 0..nx {
                mesh.add_quad(vert(i, j), vert(i + 1, j), vert(i + 1, j + 1), vert(i, j + 1));
            }
        }
        mesh.finish()?;
        Ok(mesh)
    }
}
