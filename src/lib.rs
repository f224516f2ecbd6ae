//! assignd - incident assignment decision engine
//!
//! This library routes work items to the best-suited member of their owning
//! group using a weighted score over workload, role and shift availability,
//! and commits the assignment with a pre-check/post-check protocol against a
//! system of record that offers no locking.

pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod logging;
pub mod roster;
pub mod scoring;
pub mod ticketing;
