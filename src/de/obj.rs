//! Utilities for reading Wavefront OBJ text as a [Mesh].
//!
//! # Notes
//!
//! * Only the geometry statements are understood:
//!   * `o name`: object name; logged, but doesn't split the mesh
//!   * `v x y z`: vertex position
//!   * `vn x y z`: vertex normal
//!   * `vt u v`: texture coordinate
//!   * `f a b c`: triangle; each corner is `v`, `v/vt`, `v//vn` or `v/vt/vn`
//! * Parsing is lossy, never fatal. A line is skipped when its keyword is unknown, it has too few
//!   fields, or a numeric field doesn't parse. Fields past the required ones are ignored, so
//!   n-gons are truncated to their first three corners (not triangulated).
//! * Corner indices aren't checked here; see [Mesh::position] and [Mesh::normal].
//! * Lines end at `\n`, `\r\n` or a bare `\r`. Bytes that aren't UTF-8 are replaced with `U+FFFD`
//!   rather than failing the read; they can only ever land in names, comments or unparseable fields.
//!
//! # See Also
//!
//! * [Wavefront OBJ reference](https://paulbourke.net/dataformats/obj/)

use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{Corner, Face, Mesh, Normal, Position, Result, Texcoord};

/// A single recognized line of OBJ text.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'line> {
    /// `o`; the rest of the line, trimmed
    Object(&'line str),
    /// `v`
    Position(Position),
    /// `vn`
    Normal(Normal),
    /// `vt`
    Texcoord(Texcoord),
    /// `f`
    Face(Face),
}

/// Classify one line. Returns `None` for anything that isn't a well-formed geometry statement.
pub fn parse_line(line: &str) -> Option<Statement<'_>> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "o" => Some(Statement::Object(line.trim_start()[1..].trim())),
        "v" => fields::<3>(tokens).map(|[x, y, z]| Statement::Position(Position::new(x, y, z))),
        "vn" => fields::<3>(tokens).map(|[x, y, z]| Statement::Normal(Normal::new(x, y, z))),
        "vt" => fields::<2>(tokens).map(|[u, v]| Statement::Texcoord(Texcoord::new(u, v))),
        "f" => {
            let a = Corner::parse(tokens.next()?);
            let b = Corner::parse(tokens.next()?);
            let c = Corner::parse(tokens.next()?);
            Some(Statement::Face([a, b, c]))
        }
        _ => None,
    }
}

/// Parse the first `N` tokens as floats.
fn fields<'a, const N: usize>(mut tokens: impl Iterator<Item = &'a str>) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

/// Accumulates statements into a [Mesh], keeping track of what was dropped.
#[derive(Debug, Default)]
struct MeshBuilder {
    mesh: Mesh,
    lines: usize,
    skipped: usize,
}

impl MeshBuilder {
    /// Feed one raw line, without its terminator.
    fn raw_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        if let Cow::Owned(_) = line {
            tracing::trace!(line = self.lines + 1, "replacing invalid UTF-8 in OBJ line");
        }
        self.line(&line);
    }

    fn line(&mut self, line: &str) {
        self.lines += 1;
        match parse_line(line) {
            Some(Statement::Object(name)) => {
                tracing::debug!(line = self.lines, name, "OBJ object");
            }
            Some(Statement::Position(p)) => self.mesh.vertices.push(p),
            Some(Statement::Normal(n)) => self.mesh.normals.push(n),
            Some(Statement::Texcoord(t)) => self.mesh.texcoords.push(t),
            Some(Statement::Face(f)) => self.mesh.faces.push(f),
            None => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    self.skipped += 1;
                    tracing::trace!(line = self.lines, content = trimmed, "skipping OBJ line");
                }
            }
        }
    }

    fn finish(self) -> Mesh {
        tracing::debug!(
            lines = self.lines,
            skipped = self.skipped,
            vertices = self.mesh.vertices.len(),
            normals = self.mesh.normals.len(),
            texcoords = self.mesh.texcoords.len(),
            faces = self.mesh.faces.len(),
            "parsed OBJ mesh"
        );
        self.mesh
    }
}

/// Split a `\n`-terminated chunk into lines, treating `\r\n` and a bare `\r` as line breaks too.
fn split_lines(chunk: &[u8]) -> impl Iterator<Item = &[u8]> {
    let chunk = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    chunk.split(|b| *b == b'\r')
}

/// Read a mesh from OBJ text. Fails only if the reader does.
pub fn read<R: BufRead>(mut reader: R) -> Result<Mesh> {
    let mut builder = MeshBuilder::default();
    let mut chunk = Vec::new();
    while reader.read_until(b'\n', &mut chunk)? != 0 {
        for line in split_lines(&chunk) {
            builder.raw_line(line);
        }
        chunk.clear();
    }
    Ok(builder.finish())
}

/// Load a mesh from an OBJ file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = File::open(path.as_ref())?;
    read(BufReader::new(file))
}

impl Mesh {
    /// Parse OBJ text that's already in memory.
    pub fn parse(text: &str) -> Self {
        let mut builder = MeshBuilder::default();
        for chunk in text.as_bytes().split_inclusive(|b| *b == b'\n') {
            for line in split_lines(chunk) {
                builder.raw_line(line);
            }
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn keywords() {
        assert_eq!(parse_line("o Cube.001"), Some(Statement::Object("Cube.001")));
        assert_eq!(
            parse_line("v -23.78 92.39 -105.84"),
            Some(Statement::Position(Position::new(-23.78, 92.39, -105.84)))
        );
        assert_eq!(
            parse_line("vn 0 0 1"),
            Some(Statement::Normal(Normal::new(0.0, 0.0, 1.0)))
        );
        assert_eq!(
            parse_line("vt 0.5 0.25"),
            Some(Statement::Texcoord(Texcoord::new(0.5, 0.25)))
        );
        assert_eq!(
            parse_line("f 1//1 2//2 3//3"),
            Some(Statement::Face([
                Corner::new("1", "", "1"),
                Corner::new("2", "", "2"),
                Corner::new("3", "", "3"),
            ]))
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        assert_eq!(
            parse_line("v 1 2 3 1.0"),
            Some(Statement::Position(Position::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            parse_line("vt 0.5 0.5 0"),
            Some(Statement::Texcoord(Texcoord::new(0.5, 0.5)))
        );
        // n-gons keep their first three corners
        assert_eq!(
            parse_line("f 1 2 3 4"),
            Some(Statement::Face([
                Corner::new("1", "", ""),
                Corner::new("2", "", ""),
                Corner::new("3", "", ""),
            ]))
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        for line in [
            "",
            "# v 1 2 3",
            "v 1 2",
            "v 1 two 3",
            "vn 0 0",
            "vt 0.5",
            "f 1 2",
            "usemtl Material",
            "s off",
            "g group",
            "vp 0.1 0.2",
            "v1 2 3",
        ] {
            assert_eq!(parse_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn whitespace_tolerance() {
        assert_eq!(
            parse_line("  v\t1 2  3\r"),
            Some(Statement::Position(Position::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn object_names_do_not_split() {
        let mesh = Mesh::parse(
            "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 0 0 1\nf 1 2 4\n",
        );
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn short_face_is_dropped() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2\n");
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn read_crlf() {
        let text = "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nvn 0 0 1\r\nvt 0 0\r\nf 1/1/1 2/1/1 3/1/1\r\n";
        let mesh = read(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.normals().len(), 1);
        assert_eq!(mesh.texcoords().len(), 1);
        assert_eq!(mesh.faces()[0][2], Corner::new("3", "1", "1"));
        assert_eq!(mesh, Mesh::parse(text));
    }

    #[test]
    fn read_bare_cr() {
        let text = "v 0 0 0\rv 1 0 0\rv 0 1 0\rvn 0 0 1\rf 1//1 2//1 3//1\r";
        let mesh = read(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.normals().len(), 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh, Mesh::parse(text));
    }

    #[test]
    fn read_mixed_line_endings() {
        let text = "v 0 0 0\nv 1 0 0\r\nv 0 1 0\r\rvn 0 0 1\nf 1//1 2//1 3//1";
        let mesh = read(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh, Mesh::parse(text));
    }

    #[test]
    fn split_lines_keeps_blank_lines() {
        let lines: Vec<&[u8]> = split_lines(b"a\r\rb\r\n").collect();
        assert_eq!(lines, [&b"a"[..], &b""[..], &b"b"[..]]);
        let lines: Vec<&[u8]> = split_lines(b"\n").collect();
        assert_eq!(lines, [&b""[..]]);
    }

    #[test]
    fn read_tolerates_invalid_utf8() {
        let bytes: &[u8] = b"# exported by caf\xe9\nusemtl Mat\xe9riau\nv 0 0 0\nv 1 0 0\n\xff\xfe\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = read(bytes).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.normals().len(), 1);
        assert_eq!(mesh.face_count(), 1);
    }
}
