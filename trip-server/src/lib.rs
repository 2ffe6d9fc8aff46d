//! Multi-stop trip planner server.
//!
//! Stores named locations, plans trips that visit a set of them in order
//! of distance from a starting point using ride-share price estimates, and
//! requests a ride for each leg in turn.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod planner;
pub mod rides;
pub mod store;
pub mod upstream;
pub mod web;
