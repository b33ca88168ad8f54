//! Utilities for writing [Meshes](crate::Mesh) as a single binary STL document.
//!
//! # Notes
//!
//! ## Binary STL Structure
//!
//! All values are little-endian.
//!
//! * header: 80 bytes of free-form text; here, the document name padded with spaces
//! * count: `u32` number of triangles
//! * triangles: `count` records of 50 bytes each
//!   * normal: `[f32; 3]`
//!   * vertices: `[[f32; 3]; 3]`, in winding order
//!   * attribute byte count: `u16`; always zero
//!
//! Meshes are written in the order they were added, and the faces of each mesh in the order they
//! were read. Corners are resolved against their own mesh only; nothing is shared between meshes
//! except the triangle count.
//!
//! ## Facet normals
//!
//! [FacetNormal::FromNormals] is the default: the normal is built from the three *vertex normals*
//! referenced by the face as if they were positions, `cross(n2 - n1, n3 - n1)`. Meshes with smooth
//! or flat per-vertex normals will mostly get short or zero facet normals this way, but it is the
//! output existing files were produced with. [FacetNormal::FromPositions] uses the triangle's
//! geometry instead. Neither is normalized.
//!
//! # See Also
//!
//! * [STL (file format)](https://en.wikipedia.org/wiki/STL_(file_format)#Binary)

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use nalgebra::{Point3, Vector3};

use crate::{de::obj, error::IndexError, Error, Face, Mesh, Result};

/// Length of the free-form header block.
pub const HEADER_LEN: usize = 80;
/// Length of the triangle count following the header.
pub const COUNT_LEN: usize = 4;
/// Length of one triangle record.
pub const RECORD_LEN: usize = 50;
/// Label used by [StlDocument::new].
pub const DEFAULT_NAME: &str = "unnamed";

/// Size in bytes of a document holding `triangles` triangles.
#[inline]
pub const fn document_len(triangles: usize) -> usize {
    HEADER_LEN + COUNT_LEN + RECORD_LEN * triangles
}

/// How the facet normal of each triangle record is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FacetNormal {
    /// `cross(n2 - n1, n3 - n1)` over the vertex normals referenced by each corner.
    #[default]
    FromNormals,
    /// `cross(v2 - v1, v3 - v1)` over the vertex positions; normal indices are not consulted.
    FromPositions,
}

/// A fully resolved triangle record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Facet normal, as chosen by [FacetNormal]
    pub normal: Vector3<f64>,
    /// Corner positions in winding order
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Resolve a face of `mesh` into absolute coordinates.
    pub fn from_face(mesh: &Mesh, face: &Face, facet: FacetNormal) -> Result<Self, IndexError> {
        let vertices = [
            *mesh.position(&face[0])?,
            *mesh.position(&face[1])?,
            *mesh.position(&face[2])?,
        ];
        let normal = match facet {
            FacetNormal::FromNormals => cross_of(
                mesh.normal(&face[0])?,
                mesh.normal(&face[1])?,
                mesh.normal(&face[2])?,
            ),
            FacetNormal::FromPositions => {
                cross_of(&vertices[0].coords, &vertices[1].coords, &vertices[2].coords)
            }
        };
        Ok(Self { normal, vertices })
    }

    /// Encode as a 50-byte record. Components are narrowed to `f32` here and nowhere else.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        let vectors = std::iter::once(&self.normal).chain(self.vertices.iter().map(|v| &v.coords));
        for (i, v) in vectors.enumerate() {
            for (j, c) in v.iter().enumerate() {
                let at = (i * 3 + j) * 4;
                LittleEndian::write_f32(&mut buf[at..at + 4], *c as f32);
            }
        }
        // the trailing attribute byte count stays zero
        buf
    }

    /// Write the encoded record.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// `cross(b - a, c - a)`
#[inline]
fn cross_of(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

/// An ordered collection of meshes, written out as one binary STL.
#[derive(Debug, Clone, PartialEq)]
pub struct StlDocument {
    name: String,
    facet_normal: FacetNormal,
    meshes: Vec<Mesh>,
}

impl Default for StlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StlDocument {
    /// An empty document labelled [DEFAULT_NAME], using [FacetNormal::FromNormals].
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            facet_normal: FacetNormal::default(),
            meshes: Vec::new(),
        }
    }

    /// Replace the header label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Choose how facet normals are computed.
    pub fn with_facet_normal(mut self, facet_normal: FacetNormal) -> Self {
        self.facet_normal = facet_normal;
        self
    }

    /// Replace the header label in place.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The header label, before padding or truncation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How facet normals are computed.
    pub fn facet_normal(&self) -> FacetNormal {
        self.facet_normal
    }

    /// Append a mesh. Its faces aren't checked until the document is written.
    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// [Load](obj::load) an OBJ file and append it.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.add(obj::load(path)?);
        Ok(())
    }

    /// Meshes in output order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Number of triangles the document will contain.
    pub fn total_face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }

    /// The header block: the name's bytes, cut or space-padded to exactly [HEADER_LEN].
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [b' '; HEADER_LEN];
        let name = self.name.as_bytes();
        let len = name.len().min(HEADER_LEN);
        header[..len].copy_from_slice(&name[..len]);
        header
    }

    /// Every triangle in output order. Stops being useful at the first error.
    pub fn triangles(&self) -> impl Iterator<Item = Result<Triangle>> + '_ {
        let facet = self.facet_normal;
        self.meshes.iter().enumerate().flat_map(move |(m, mesh)| {
            mesh.faces().iter().enumerate().map(move |(f, face)| {
                Triangle::from_face(mesh, face, facet).map_err(|source| Error::Face {
                    mesh: m,
                    face: f,
                    source,
                })
            })
        })
    }

    /// Stream the whole document.
    ///
    /// On error, whatever was already written stays written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let total = self.total_face_count();
        let count = u32::try_from(total).map_err(|_| Error::TooManyTriangles(total))?;
        writer.write_all(&self.header())?;
        writer.write_u32::<LittleEndian>(count)?;
        for triangle in self.triangles() {
            triangle?.write_to(writer)?;
        }
        Ok(())
    }

    /// The whole document in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(document_len(self.total_face_count()));
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Create (or truncate) `path` and write the document to it.
    ///
    /// A failed save can leave a truncated file behind; it is not removed.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), name = %self.name))]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::debug!(
            meshes = self.meshes.len(),
            triangles = self.total_face_count(),
            "wrote STL document"
        );
        Ok(())
    }
}
