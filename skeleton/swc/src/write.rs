//! SWC writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SwcResult;
use crate::node::SkeletonRecord;

/// Write the preamble, then one `id type x y z radius parent` line per
/// node with 1-based ids and parent `-1` for roots.
///
/// Floats are written in shortest round-trip form, so reading the output
/// back reproduces the record exactly.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_swc<W: Write>(record: &SkeletonRecord, mut writer: W) -> SwcResult<()> {
    for line in &record.preamble {
        writeln!(writer, "{line}")?;
    }
    for (i, node) in record.nodes.iter().enumerate() {
        let parent = node.parent.map_or(-1, |p| i64::try_from(p + 1).unwrap_or(-1));
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            i + 1,
            node.node_type,
            node.position.x,
            node.position.y,
            node.position.z,
            node.radius,
            parent
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `record` to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_swc<P: AsRef<Path>>(record: &SkeletonRecord, path: P) -> SwcResult<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), nodes = record.len(), "writing skeleton");
    write_swc(record, BufWriter::new(File::create(path)?))
}

/// `cell.swc` becomes `cell_clean.swc` in the same directory.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_clean.swc"))
}
