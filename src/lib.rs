/*!
An indexed triangle mesh kernel for shoe last design.

# Overview

+ A [`Mesh`] is three flat arrays of records: vertices, edges and triangles.
  Records refer to each other through the handle types [`VH`], [`EH`] and
  [`TH`]. Besides positions, the records carry normals, colors, texture
  coordinates, group labels and orientation bits.

+ Meshes are built incrementally with [`Mesh::add_vertex`],
  [`Mesh::add_triangle`], [`Mesh::add_quad`] and friends, then brought into
  canonical form with [`Mesh::finish`]. The canonical form has coincident
  vertices welded, duplicate edges and triangles removed, every element sorted,
  and the edge to triangle adjacency rebuilt. The individual steps
  ([`Mesh::fix`], [`Mesh::sort`], [`Mesh::join`]) are public.

+ Every reordering or merge produces an [`IndexMap`] per element kind. The maps
  are kept in the mesh, so records copied from another mesh can be rewired with
  [`Mesh::remap`].

+ [`Mesh::check`] verifies the structural invariants and reports the number of
  problems per category in a [`SelfCheck`].

+ Derived data: normals ([`Mesh::calculate_normals`],
  [`Mesh::propagate_normals`]), texture coordinates and their per triangle
  tangent frames, sharp edges and smooth groups ([`Mesh::calculate_groups`]),
  and connected objects ([`Mesh::calculate_objects`]).

+ [`Mesh::intersect_plane`] slices the mesh with a plane into a [`Polygon3`] of
  oriented chains, which can be simplified, measured and triangulated.

Diagnostics go through the [`log`](https://crates.io/crates/log) facade. No
logger is installed by this crate.
*/

mod canonical;
mod check;
mod create;
mod element;
mod error;
mod macros;
mod mesh;
mod normals;
mod polygon;
mod primitive;
mod remap;
mod slice;
mod status;
mod topol;
mod transform;
mod uv;

pub use check::SelfCheck;
pub use create::AddContext;
pub use element::{EH, Edge, Handle, TH, Triangle, VH, Vertex, WHITE};
pub use error::Error;
pub use mesh::{DEFAULT_EPSILON, Mesh};
pub use polygon::{Polygon3, PolygonEdge, PolygonVertex};
pub use remap::{IndexMap, Maps};
pub use status::Status;
pub use topol::Groups;
