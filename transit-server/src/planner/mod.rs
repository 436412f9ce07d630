//! Journey planning over the loaded networks.
//!
//! This module answers "how do I get from A to B, leaving at this time on
//! this kind of day?". It resolves stop names, picks the router pair for the
//! requested scope and turns the route into a [`Journey`](crate::domain::Journey).

mod config;
mod scope;
mod search;
mod shared;


pub use config::{Algorithm, InvalidAlgorithm, PlannerConfig};
pub use scope::{InvalidScope, Scope};
pub use search::{JourneyPlanner, PlanError, PlanRequest};
pub use shared::{ReloadError, SharedPlanner};
