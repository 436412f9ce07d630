//! Stop and trip networks.
//!
//! Each loaded mode gets a [`NetworkGraph`]. The [`CombinedGraph`] unions
//! them and links nearby stops with walking transfers, and can hand out a
//! mode-filtered [`Selection`] for a router to be built over.

mod catalog;
mod combined;
mod graph;
mod resolve;
mod spatial;
mod walking;

pub use catalog::StopCatalog;
pub use combined::{CombinedGraph, Selection, effective_modes};
pub use graph::NetworkGraph;
pub use resolve::{StopResolver, tokenize};
pub use spatial::StopLocator;
pub use walking::{WalkingConfig, WalkingTransfers};
