use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    // Indexing.
    #[error("{kind} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{kind} {index} has no counterpart in the index map")]
    UnmappedIndex { kind: &'static str, index: usize },
    // Preconditions.
    /// The operation requires a mesh that passes the self check.
    #[error("the mesh failed its self check")]
    SelfCheckFailed,
    // Polygons.
    #[error("the polygon is not a single closed loop")]
    OpenPolygon,
    #[error("the polygon has no area")]
    DegeneratePolygon,
}

impl Error {
    pub(crate) fn out_of_range<H: crate::element::Handle>(h: H, len: usize) -> Self {
        Error::IndexOutOfRange {
            kind: H::KIND,
            index: h.index() as usize,
            len,
        }
    }
}
