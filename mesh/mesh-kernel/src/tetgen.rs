//! Calls into the `tetgen` tetrahedral mesher.

use std::path::Path;

use tracing::debug;
use xshell::{Shell, cmd};

use crate::error::{KernelError, KernelResult};

/// Line tetgen prints after `-d` finds no intersecting facets.
const NO_INTERSECTIONS: &str = "No faces are intersecting";

/// True when `tetgen -d` output reports a self-intersection-free surface.
#[must_use]
pub fn reports_no_intersections(output: &str) -> bool {
    output.contains(NO_INTERSECTIONS)
}

/// Run `tetgen` with whitespace-separated `args` on `mesh`, from the
/// directory holding the mesh so its output files land next to it.
///
/// Returns the captured standard output. A non-zero exit status is not an
/// error: tetgen exits non-zero when it finds intersections, which callers
/// read from the output.
///
/// # Errors
///
/// Returns [`KernelError::ToolMissing`] if tetgen cannot be started.
pub fn run_tetgen(tetgen: &Path, mesh: &Path, args: &str) -> KernelResult<String> {
    let missing = |reason: String| KernelError::ToolMissing {
        tool: tetgen.to_path_buf(),
        reason,
    };

    let sh = Shell::new().map_err(|e| missing(e.to_string()))?;
    if let Some(dir) = mesh.parent().filter(|d| !d.as_os_str().is_empty()) {
        sh.change_dir(dir);
    }
    let flags: Vec<&str> = args.split_whitespace().collect();

    debug!(tool = %tetgen.display(), mesh = %mesh.display(), args, "running tetgen");
    let output = cmd!(sh, "{tetgen} {flags...} {mesh}")
        .quiet()
        .ignore_status()
        .output()
        .map_err(|e| missing(e.to_string()))?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_clean_report() {
        let out = "Opening candidate.ply.\nChecking intersections...\n  No faces are intersecting.\n";
        assert!(reports_no_intersections(out));
    }

    #[test]
    fn intersecting_report_is_rejected() {
        let out = "Checking intersections...\n  Found 12 pairs of faces are intersecting.\n";
        assert!(!reports_no_intersections(out));
        assert!(!reports_no_intersections(""));
    }

    #[test]
    fn missing_binary_is_tool_missing() {
        let result = run_tetgen(
            Path::new("/nonexistent/tetgen-binary-for-tests"),
            Path::new("mesh.ply"),
            "-d",
        );
        assert!(matches!(result, Err(KernelError::ToolMissing { .. })));
    }
}
