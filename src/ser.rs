//! Serialization of geometry to binary mesh formats.

pub mod stl;
