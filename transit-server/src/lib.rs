//! Cape Town transit journey planner server.
//!
//! Loads the train, MyCiTi, Golden Arrow and minibus-taxi schedules from
//! CSV, links the networks with walking transfers and answers: "leaving
//! this stop at this time, when is the earliest I can reach that one?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod metrics;
pub mod network;
pub mod planner;
pub mod router;
pub mod web;
