//! In-memory geometry of a single OBJ file.
//!
//! A [Mesh] owns its own attribute lists; face corners index only into the mesh they were read
//! with. Corner indices are kept exactly as they appeared in the source and are resolved against
//! the mesh only when a triangle is emitted (see [Mesh::position] and [Mesh::normal]).

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Attribute, IndexError};

/// `v x y z`
pub type Position = Point3<f64>;
/// `vn x y z`
pub type Normal = Vector3<f64>;
/// `vt u v`
pub type Texcoord = Point2<f64>;

/// One vertex reference of a face: `v`, `v/vt`, `v//vn` or `v/vt/vn`.
///
/// Each slot holds the raw, 1-based index token from the source; absent slots are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Corner {
    vertex: String,
    texcoord: String,
    normal: String,
}

impl Corner {
    /// Build a corner from its three raw slots; pass `""` for an absent slot.
    pub fn new(
        vertex: impl Into<String>,
        texcoord: impl Into<String>,
        normal: impl Into<String>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            texcoord: texcoord.into(),
            normal: normal.into(),
        }
    }

    /// Split a slash-delimited corner token. Sub-tokens past the third are dropped.
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split('/');
        let mut next = || parts.next().unwrap_or_default();
        Self::new(next(), next(), next())
    }

    /// Raw position index token.
    #[inline]
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// Raw texture coordinate index token; often empty.
    #[inline]
    pub fn texcoord(&self) -> &str {
        &self.texcoord
    }

    /// Raw normal index token; often empty.
    #[inline]
    pub fn normal(&self) -> &str {
        &self.normal
    }
}

/// A triangle, as three corners in winding order.
pub type Face = [Corner; 3];

/// Geometry read from one OBJ file.
///
/// Lists only ever grow while the file is read; a finished mesh is not modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub(crate) vertices: Vec<Position>,
    pub(crate) normals: Vec<Normal>,
    pub(crate) texcoords: Vec<Texcoord>,
    pub(crate) faces: Vec<Face>,
}

impl Mesh {
    /// An empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex positions, in file order.
    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Vertex normals, in file order.
    pub fn normals(&self) -> &[Normal] {
        &self.normals
    }

    /// Texture coordinates; parsed for completeness, never written to STL.
    pub fn texcoords(&self) -> &[Texcoord] {
        &self.texcoords
    }

    /// Triangles, in file order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of triangles.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no triangles, regardless of its other lists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Look up the position a corner refers to.
    pub fn position(&self, corner: &Corner) -> Result<&Position, IndexError> {
        let i = resolve(corner.vertex(), Attribute::Position, self.vertices.len())?;
        Ok(&self.vertices[i])
    }

    /// Look up the vertex normal a corner refers to.
    pub fn normal(&self, corner: &Corner) -> Result<&Normal, IndexError> {
        let i = resolve(corner.normal(), Attribute::Normal, self.normals.len())?;
        Ok(&self.normals[i])
    }
}

/// Convert a 1-based index token into a 0-based index into a list of length `len`.
pub(crate) fn resolve(token: &str, attribute: Attribute, len: usize) -> Result<usize, IndexError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(IndexError::Missing { attribute });
    }
    let index: i64 = token.parse().map_err(|_| IndexError::Invalid {
        attribute,
        token: token.to_owned(),
    })?;
    match usize::try_from(index) {
        Ok(i) if (1..=len).contains(&i) => Ok(i - 1),
        _ => Err(IndexError::OutOfRange {
            attribute,
            index,
            len,
        }),
    }
}
