//! Routing overrides from environment and command line flags.
//!
//! Precedence, lowest first: the document's own grid and config, then
//! environment variables, then flags.

use gridwire_core::{GridSpec, RoutingConfig};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    pub clearance: Option<f64>,
    pub stub_length: Option<f64>,
    pub epsilon: Option<f64>,
    pub lane_tracks: Option<usize>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            clearance: parsed(&lookup, "GRIDWIRE_CLEARANCE"),
            stub_length: parsed(&lookup, "GRIDWIRE_STUB_LENGTH"),
            epsilon: parsed(&lookup, "GRIDWIRE_EPSILON"),
            lane_tracks: parsed(&lookup, "GRIDWIRE_LANE_TRACKS"),
        }
    }

    /// Values set in `other` win.
    pub fn overridden_by(self, other: CliConfig) -> Self {
        Self {
            clearance: other.clearance.or(self.clearance),
            stub_length: other.stub_length.or(self.stub_length),
            epsilon: other.epsilon.or(self.epsilon),
            lane_tracks: other.lane_tracks.or(self.lane_tracks),
        }
    }

    pub fn apply(&self, grid: &mut GridSpec, config: &mut RoutingConfig) {
        if let Some(clearance) = self.clearance {
            config.clearance = clearance;
        }
        if let Some(stub_length) = self.stub_length {
            config.stub_length = stub_length;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(lane_tracks) = self.lane_tracks {
            grid.lane_tracks = lane_tracks;
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_and_ignores_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("GRIDWIRE_CLEARANCE", "4.5"),
            ("GRIDWIRE_LANE_TRACKS", "two"),
            ("GRIDWIRE_EPSILON", " 0.5 "),
        ]
        .into_iter()
        .collect();
        let config = CliConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.clearance, Some(4.5));
        assert_eq!(config.epsilon, Some(0.5));
        assert_eq!(config.lane_tracks, None);
        assert_eq!(config.stub_length, None);
    }

    #[test]
    fn flags_override_environment() {
        let env = CliConfig {
            clearance: Some(3.0),
            lane_tracks: Some(5),
            ..CliConfig::default()
        };
        let flags = CliConfig {
            clearance: Some(1.0),
            ..CliConfig::default()
        };
        let merged = env.overridden_by(flags);
        assert_eq!(merged.clearance, Some(1.0));
        assert_eq!(merged.lane_tracks, Some(5));

        let mut grid = GridSpec::default();
        let mut routing = RoutingConfig::default();
        merged.apply(&mut grid, &mut routing);
        assert_eq!(routing.clearance, 1.0);
        assert_eq!(routing.stub_length, 10.0);
        assert_eq!(grid.lane_tracks, 5);
    }
}
