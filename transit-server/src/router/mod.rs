//! Earliest-arrival routing.
//!
//! Both routers work on a time-expanded model of the timetable: every
//! scheduled trip is projected into absolute minutes and duplicated for the
//! following day, so a late-evening query can still board an early-morning
//! departure without modular arithmetic at query time.
//!
//! - [`RoundBasedRouter`] relaxes outgoing connections of the stops improved
//!   in the previous round; the round limit bounds search depth, and one
//!   round may chain several legs.
//! - [`ConnectionScanRouter`] makes a single pass over all connections in
//!   departure order, pruning once the target is reached.
//!
//! The routers are generic over [`TimetableEntry`], so the same code serves
//! each single-mode network and the combined one. They hold no shared state
//! and are safe to query concurrently.

mod connections;
mod csa;
mod raptor;
mod result;


use std::hash::Hash;
use std::sync::Arc;

use crate::domain::{ClockTime, DayType};

pub use connections::BuildStats;
pub use csa::ConnectionScanRouter;
pub use raptor::RoundBasedRouter;
pub use result::RouteResult;

/// A directed edge the routers can traverse.
pub trait TimetableEntry {
    type Stop: Eq + Hash + Clone;

    fn departure_stop(&self) -> &Self::Stop;

    fn destination_stop(&self) -> &Self::Stop;

    /// Scheduled departure, or `None` if the entry can be taken immediately
    /// on arrival at its departure stop.
    fn departure_time(&self) -> Option<ClockTime>;

    fn duration_mins(&self) -> u32;

    /// Service day the entry runs on. Ignored for entries with no
    /// departure time.
    fn day_type(&self) -> DayType;
}

impl<T: TimetableEntry + ?Sized> TimetableEntry for Arc<T> {
    type Stop = T::Stop;

    fn departure_stop(&self) -> &Self::Stop {
        (**self).departure_stop()
    }

    fn destination_stop(&self) -> &Self::Stop {
        (**self).destination_stop()
    }

    fn departure_time(&self) -> Option<ClockTime> {
        (**self).departure_time()
    }

    fn duration_mins(&self) -> u32 {
        (**self).duration_mins()
    }

    fn day_type(&self) -> DayType {
        (**self).day_type()
    }
}
