//! gridwire CLI - command line tools driving the routing core.
//!
//! Binaries:
//! - gridwire: resolve, inspect and edit the routes of a JSON document
//! - demo_scenario: route and edit on a fully occupied tile grid

pub mod config;
pub mod document;
pub mod logging;
pub mod report;
pub mod scenarios;

pub use config::CliConfig;
pub use document::{Document, DocumentError};
pub use logging::init_tracing;
pub use report::{RoutesReport, ShiftReport};
