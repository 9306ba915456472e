//! Routing tolerances and margins.

use serde::{Deserialize, Serialize};

/// Configuration shared by every routing call site. One epsilon is used for
/// obstacle interiors, axis matching and rectilinearity so the checks agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Margin every obstacle is grown by before routing (world units)
    pub clearance: f64,
    /// Length of the leg from a port out to its lattice stub
    pub stub_length: f64,
    /// Tolerance for boundary contact and coordinate matching
    pub epsilon: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            stub_length: 10.0,
            epsilon: 0.25,
        }
    }
}
