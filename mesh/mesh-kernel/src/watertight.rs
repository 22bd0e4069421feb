//! Watertightness predicate.
//!
//! A mesh is watertight when it is topologically closed and manifold and
//! none of its faces intersect. The first half is checked in-process. The
//! second half is delegated to `tetgen -d` on a staged copy of the mesh;
//! when tetgen is unavailable a single-component heuristic stands in.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use mesh_types::IndexedMesh;
use tracing::{debug, warn};

use crate::components::find_connected_components;
use crate::error::{KernelError, KernelResult};
use crate::staging::StagingArea;
use crate::tetgen::{reports_no_intersections, run_tetgen};
use crate::topology::{TopologyReport, inspect_topology};

/// How the self-intersection half of the check was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionCheck {
    /// `tetgen -d` reported on the staged mesh.
    Tetgen,
    /// The mesh was judged on having a single connected component.
    ComponentHeuristic,
}

/// Outcome of a watertightness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatertightVerdict {
    /// Topology half of the check.
    pub topology: TopologyReport,
    /// Self-intersection half, `None` when skipped because the topology
    /// check already failed.
    pub intersection_free: Option<bool>,
    /// Method used for the self-intersection half.
    pub method: Option<IntersectionCheck>,
}

impl WatertightVerdict {
    /// Closed manifold without self-intersections.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.topology.is_closed_manifold() && self.intersection_free == Some(true)
    }
}

/// Runs the watertightness predicate.
#[derive(Debug)]
pub struct WatertightChecker {
    tetgen: Option<PathBuf>,
    allow_heuristic: bool,
    tetgen_unavailable: AtomicBool,
}

impl Default for WatertightChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl WatertightChecker {
    /// Use `tetgen` from `PATH`, falling back to the heuristic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tetgen: Some(PathBuf::from("tetgen")),
            allow_heuristic: true,
            tetgen_unavailable: AtomicBool::new(false),
        }
    }

    /// Use the tetgen executable at `path`.
    #[must_use]
    pub fn with_tetgen(mut self, path: impl Into<PathBuf>) -> Self {
        self.tetgen = Some(path.into());
        self
    }

    /// Never call tetgen.
    #[must_use]
    pub fn without_tetgen(mut self) -> Self {
        self.tetgen = None;
        self
    }

    /// Allow or forbid the component heuristic when tetgen is unavailable.
    #[must_use]
    pub const fn with_heuristic_fallback(mut self, allow: bool) -> Self {
        self.allow_heuristic = allow;
        self
    }

    /// Tetgen executable, if one is configured.
    #[must_use]
    pub fn tetgen(&self) -> Option<&Path> {
        self.tetgen.as_deref()
    }

    /// Check `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::NoIntersectionCheck`] if tetgen is unavailable
    /// and the heuristic is forbidden, or a staging error.
    pub fn check(&self, mesh: &IndexedMesh) -> KernelResult<WatertightVerdict> {
        let topology = inspect_topology(mesh);
        if !topology.is_closed_manifold() {
            debug!(%topology, "mesh is not a closed manifold");
            return Ok(WatertightVerdict {
                topology,
                intersection_free: None,
                method: None,
            });
        }

        if let Some(free) = self.tetgen_check(mesh)? {
            return Ok(WatertightVerdict {
                topology,
                intersection_free: Some(free),
                method: Some(IntersectionCheck::Tetgen),
            });
        }

        if !self.allow_heuristic {
            return Err(KernelError::NoIntersectionCheck);
        }
        let single = find_connected_components(mesh).component_count() == 1;
        Ok(WatertightVerdict {
            topology,
            intersection_free: Some(single),
            method: Some(IntersectionCheck::ComponentHeuristic),
        })
    }

    /// `Ok(None)` when tetgen is not configured or cannot be started.
    fn tetgen_check(&self, mesh: &IndexedMesh) -> KernelResult<Option<bool>> {
        let Some(tetgen) = self.tetgen.as_deref() else {
            return Ok(None);
        };
        if self.tetgen_unavailable.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let area = StagingArea::new("watertight")?;
        let staged = area.stage(mesh, "candidate.ply")?;
        match run_tetgen(tetgen, &staged, "-d") {
            Ok(output) => Ok(Some(reports_no_intersections(&output))),
            Err(KernelError::ToolMissing { tool, reason }) => {
                warn!(
                    tool = %tool.display(),
                    reason,
                    "tetgen unavailable, using the connected-component heuristic for self-intersections"
                );
                self.tetgen_unavailable.store(true, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
