//! Domain types for the transit journey planner.
//!
//! This module contains the validated value types shared by ingestion, the
//! routers and the web layer. All types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod day_type;
mod error;
mod journey;
mod mode;
mod stop;
mod time;
mod trip;

pub use day_type::{DayType, InvalidDayType};
pub use error::DomainError;
pub use journey::{Journey, TransferPolicy};
pub use mode::{InvalidMode, Mode, RouteLabel};
pub use stop::{Stop, haversine_km};
pub use time::{ClockTime, MINUTES_PER_DAY, TimeError};
pub use trip::Trip;
