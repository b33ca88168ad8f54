//! Errors raised while reading OBJ meshes and writing STL documents.

use std::fmt;
use std::io;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The vertex attribute a face corner refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// The `v` slot of a corner
    Position,
    /// The `vn` slot of a corner
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Position => f.write_str("position"),
            Attribute::Normal => f.write_str("normal"),
        }
    }
}

/// A face corner that can't be resolved against its mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The slot is empty, e.g. `f 1 2 3` has no normal indices.
    #[error("corner has no {attribute} index")]
    Missing {
        /// Slot that was looked up
        attribute: Attribute,
    },
    /// The slot holds something other than an integer.
    #[error("{attribute} index is not an integer: {token:?}")]
    Invalid {
        /// Slot that was looked up
        attribute: Attribute,
        /// The offending token
        token: String,
    },
    /// The index is zero, negative, or past the end of its list.
    #[error("{attribute} index out of range: (1..={len}) ∌ {index}")]
    OutOfRange {
        /// Slot that was looked up
        attribute: Attribute,
        /// The 1-based index as written
        index: i64,
        /// Length of the list it was resolved against
        len: usize,
    },
}

/// Errors related to [Meshes](crate::Mesh) and [StlDocuments](crate::StlDocument).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading an input or writing the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A face couldn't be resolved while writing.
    #[error("mesh {mesh}, face {face}: {source}")]
    Face {
        /// Position of the mesh within its document
        mesh: usize,
        /// Position of the face within its mesh
        face: usize,
        /// What was wrong with the face
        #[source]
        source: IndexError,
    },
    /// The triangle count doesn't fit the `u32` count field.
    #[error("too many triangles for a binary STL: {0} > {}", u32::MAX)]
    TooManyTriangles(usize),
}
