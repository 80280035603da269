//! SMS Gatekeeper - Admission Control for Outbound SMS
//!
//! This crate implements an in-memory admission-control service that sits in
//! front of an outbound SMS channel. Every send request is checked against two
//! independent per-second caps, one per destination phone number and one for
//! the whole account, using fixed (tumbling) one-second windows. A background
//! sweep evicts records for numbers that have gone idle, bounding memory.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
