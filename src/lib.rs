#![doc = include_str!("../README.md")]
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod de;
pub mod error;
pub mod ser;

mod mesh;
pub use mesh::*;

pub use error::{Error, Result};
pub use ser::stl::{FacetNormal, StlDocument, Triangle};
