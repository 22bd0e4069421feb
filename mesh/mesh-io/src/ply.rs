//! PLY reading and writing.
//!
//! Reads ASCII, binary little-endian and binary big-endian files with
//! float or double coordinates. Polygons with more than three corners are
//! fan-triangulated. Writes double-precision coordinates.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{IoError, IoResult};

const COMMENT: &str = "written by swc-mesh mesh-io";
const FACE_LIST: &str = "vertex_indices";

/// Read an ASCII or binary PLY mesh.
///
/// # Errors
///
/// Fails when the file is missing or unreadable, the header or body is
/// malformed, a vertex lacks numeric `x`/`y`/`z`, or a face indexes past
/// the vertex list.
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let mut reader = File::open(path).map(BufReader::new).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IoError::Io(e),
    })?;

    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("body: {e}")))?;

    let vertices = match payload.get("vertex") {
        Some(elements) => read_vertices(elements)?,
        None => Vec::new(),
    };
    let faces = match payload.get("face") {
        Some(elements) => read_faces(elements, vertices.len())?,
        None => Vec::new(),
    };
    Ok(IndexedMesh::from_parts(vertices, faces))
}

fn read_vertices(elements: &[DefaultElement]) -> IoResult<Vec<Vertex>> {
    elements
        .iter()
        .enumerate()
        .map(|(i, element)| {
            let mut xyz = [0.0; 3];
            for (slot, key) in xyz.iter_mut().zip(["x", "y", "z"]) {
                *slot = scalar(element, key).ok_or_else(|| {
                    IoError::invalid_content(format!("vertex {i}: missing numeric {key}"))
                })?;
            }
            Ok(Vertex::from_coords(xyz[0], xyz[1], xyz[2]))
        })
        .collect()
}

/// Polygons are fanned around their first corner.
#[allow(clippy::cast_possible_truncation)]
fn read_faces(elements: &[DefaultElement], vertex_count: usize) -> IoResult<Vec<[u32; 3]>> {
    let mut faces = Vec::with_capacity(elements.len());
    for (face, element) in elements.iter().enumerate() {
        let corners = index_list(element);
        if let Some(&index) = corners.iter().find(|&&i| i >= vertex_count) {
            return Err(IoError::IndexOutOfRange {
                face,
                index,
                vertex_count,
            });
        }
        if let Some((&apex, rest)) = corners.split_first() {
            faces.extend(rest.windows(2).map(|w| [apex as u32, w[0] as u32, w[1] as u32]));
        }
    }
    Ok(faces)
}

fn scalar(element: &DefaultElement, key: &str) -> Option<f64> {
    Some(match *element.get(key)? {
        Property::Double(v) => v,
        Property::Float(v) => f64::from(v),
        Property::Int(v) => f64::from(v),
        Property::Short(v) => f64::from(v),
        _ => return None,
    })
}

#[allow(clippy::cast_sign_loss)]
fn index_list(element: &DefaultElement) -> Vec<usize> {
    let widen = |prop: &Property| -> Option<Vec<usize>> {
        Some(match prop {
            Property::ListInt(v) => v.iter().map(|&i| i as usize).collect(),
            Property::ListUInt(v) => v.iter().map(|&i| i as usize).collect(),
            Property::ListShort(v) => v.iter().map(|&i| i as usize).collect(),
            Property::ListUShort(v) => v.iter().map(|&i| i as usize).collect(),
            Property::ListChar(v) => v.iter().map(|&i| i as usize).collect(),
            Property::ListUChar(v) => v.iter().map(|&i| usize::from(i)).collect(),
            _ => return None,
        })
    };
    [FACE_LIST, "vertex_index"]
        .iter()
        .filter_map(|key| element.get(*key))
        .find_map(widen)
        .unwrap_or_default()
}

/// Write `mesh` as PLY with double coordinates.
///
/// `binary` selects little-endian binary, otherwise ASCII.
///
/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn save_ply<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    if binary {
        write_binary(mesh, &mut out)?;
    } else {
        write_ascii(mesh, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

/// ply-rs puts the element count where binary list lengths belong, so the
/// binary encoding is written directly.
#[allow(clippy::cast_possible_wrap)]
fn write_binary<W: Write>(mesh: &IndexedMesh, out: &mut W) -> IoResult<()> {
    let header = [
        "ply".to_string(),
        "format binary_little_endian 1.0".to_string(),
        format!("comment {COMMENT}"),
        format!("element vertex {}", mesh.vertices.len()),
        "property double x".to_string(),
        "property double y".to_string(),
        "property double z".to_string(),
        format!("element face {}", mesh.faces.len()),
        format!("property list uchar int {FACE_LIST}"),
        "end_header".to_string(),
    ];
    for line in &header {
        writeln!(out, "{line}")?;
    }

    for p in mesh.vertices.iter().map(|v| v.position) {
        for c in [p.x, p.y, p.z] {
            out.write_all(&c.to_le_bytes())?;
        }
    }
    for face in &mesh.faces {
        out.write_all(&[3])?;
        for &i in face {
            out.write_all(&(i as i32).to_le_bytes())?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
fn write_ascii<W: Write>(mesh: &IndexedMesh, out: &mut W) -> IoResult<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header.comments.push(COMMENT.to_string());

    let mut vertex = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    }
    vertex.count = mesh.vertices.len();

    let mut face = ElementDef::new("face".to_string());
    face.properties.add(PropertyDef::new(
        FACE_LIST.to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    face.count = mesh.faces.len();

    ply.header.elements.add(vertex);
    ply.header.elements.add(face);

    let rows = mesh.vertices.iter().map(|v| {
        let mut row = DefaultElement::new();
        for (axis, c) in ["x", "y", "z"].into_iter().zip(v.position.iter()) {
            row.insert(axis.to_string(), Property::Double(*c));
        }
        row
    });
    ply.payload.insert("vertex".to_string(), rows.collect());

    let rows = mesh.faces.iter().map(|f| {
        let mut row = DefaultElement::new();
        let corners = f.iter().map(|&i| i as i32).collect();
        row.insert(FACE_LIST.to_string(), Property::ListInt(corners));
        row
    });
    ply.payload.insert("face".to_string(), rows.collect());

    Writer::new()
        .write_ply(out, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("writing: {e}")))?;
    Ok(())
}
