const VERTEX_NORMALS: u8 = 1 << 0;
const EDGE_NORMALS: u8 = 1 << 1;
const TRIANGLE_NORMALS: u8 = 1 << 2;
const TEXTURE: u8 = 1 << 3;
const FINISHED: u8 = 1 << 4;

/// Pipeline flags of a mesh.
///
/// The three normal flags record which entity kinds hold trusted normals, and
/// drive normal propagation. `texture` is set when at least one triangle has a
/// non degenerate texture mapping. `finished` is set by `Mesh::finish` and
/// cleared by every insertion.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Status {
    flags: u8,
}

impl Status {
    fn check(&self, i: u8) -> bool {
        self.flags & i > 0
    }

    fn set(&mut self, i: u8, flag: bool) {
        if flag {
            self.flags |= i;
        } else {
            self.flags &= !i;
        }
    }

    pub fn vertex_normals(&self) -> bool {
        self.check(VERTEX_NORMALS)
    }

    pub fn set_vertex_normals(&mut self, flag: bool) {
        self.set(VERTEX_NORMALS, flag)
    }

    pub fn edge_normals(&self) -> bool {
        self.check(EDGE_NORMALS)
    }

    pub fn set_edge_normals(&mut self, flag: bool) {
        self.set(EDGE_NORMALS, flag)
    }

    pub fn triangle_normals(&self) -> bool {
        self.check(TRIANGLE_NORMALS)
    }

    pub fn set_triangle_normals(&mut self, flag: bool) {
        self.set(TRIANGLE_NORMALS, flag)
    }

    /// True if vertices, edges and triangles all have normals.
    pub fn all_normals(&self) -> bool {
        self.vertex_normals() && self.edge_normals() && self.triangle_normals()
    }

    /// True if any one of vertices, edges or triangles has normals.
    pub fn any_normals(&self) -> bool {
        self.vertex_normals() || self.edge_normals() || self.triangle_normals()
    }

    pub fn texture(&self) -> bool {
        self.check(TEXTURE)
    }

    pub fn set_texture(&mut self, flag: bool) {
        self.set(TEXTURE, flag)
    }

    pub fn finished(&self) -> bool {
        self.check(FINISHED)
    }

    pub fn set_finished(&mut self, flag: bool) {
        self.set(FINISHED, flag)
    }
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn t_flags() {
        let mut s = Status::default();
        assert!(!s.any_normals());
        s.set_edge_normals(true);
        assert!(s.any_normals());
        assert!(!s.all_normals());
        s.set_vertex_normals(true);
        s.set_triangle_normals(true);
        assert!(s.all_normals());
        s.set_edge_normals(false);
        assert!(!s.edge_normals());
        assert!(s.vertex_normals() && s.triangle_normals());
        s.set_finished(true);
        s.set_texture(true);
        assert!(s.finished() && s.texture());
    }
}
