//! Skeleton measures used to size meshing parameters.

use mesh_types::Aabb;

use crate::error::{SwcError, SwcResult};
use crate::node::SkeletonRecord;

impl SkeletonRecord {
    /// Sum of parent-child edge lengths.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.nodes
            .iter()
            .filter_map(|n| {
                n.parent
                    .and_then(|p| self.nodes.get(p))
                    .map(|parent| (n.position - parent.position).norm())
            })
            .sum()
    }

    /// Smallest radius, `None` for an empty record.
    #[must_use]
    pub fn min_radius(&self) -> Option<f64> {
        self.nodes.iter().map(|n| n.radius).reduce(f64::min)
    }

    /// Largest radius, `None` for an empty record.
    #[must_use]
    pub fn max_radius(&self) -> Option<f64> {
        self.nodes.iter().map(|n| n.radius).reduce(f64::max)
    }

    /// Bounding box of node positions.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.nodes.iter().map(|n| &n.position))
    }

    /// Bounding-box diagonal of node positions.
    ///
    /// # Errors
    ///
    /// Returns [`SwcError::DegenerateExtent`] unless at least two distinct
    /// points exist.
    pub fn diagonal(&self) -> SwcResult<f64> {
        let diagonal = self.bounds().diagonal();
        if diagonal > 0.0 {
            Ok(diagonal)
        } else {
            Err(SwcError::DegenerateExtent)
        }
    }
}
