//! Deserialization of geometry from text mesh formats.

pub mod obj;
