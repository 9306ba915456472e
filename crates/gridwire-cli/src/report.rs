//! JSON shapes printed by the binaries.

use gridwire_core::{ConnectionId, EditResult, ResolvedRoute, RouteSource, RouteStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesReport {
    pub revision: u64,
    pub routes: Vec<ResolvedRoute>,
}

impl RoutesReport {
    /// Connections whose route is not a valid lattice route.
    pub fn fallbacks(&self) -> impl Iterator<Item = &ResolvedRoute> + '_ {
        self.routes.iter().filter(|route| match route.source {
            RouteSource::LivePreview { valid } => !valid,
            RouteSource::Override => false,
            RouteSource::Computed { status } => status != RouteStatus::Found,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub connection: ConnectionId,
    pub segment: usize,
    pub result: EditResult,
    pub committed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwire_core::Point;

    fn resolved(id: &str, source: RouteSource) -> ResolvedRoute {
        ResolvedRoute {
            connection: ConnectionId::new(id),
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            source,
        }
    }

    #[test]
    fn fallbacks_lists_unrouted_connections() {
        let report = RoutesReport {
            revision: 2,
            routes: vec![
                resolved("ok", RouteSource::Computed { status: RouteStatus::Found }),
                resolved("stuck", RouteSource::Computed { status: RouteStatus::Unreachable }),
                resolved("kept", RouteSource::Override),
                resolved("drag", RouteSource::LivePreview { valid: false }),
            ],
        };
        let ids: Vec<&str> = report.fallbacks().map(|r| r.connection.0.as_str()).collect();
        assert_eq!(ids, vec!["stuck", "drag"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["routes"][1]["source"]["kind"], "computed");
        assert_eq!(json["routes"][1]["source"]["status"], "unreachable");
    }
}
