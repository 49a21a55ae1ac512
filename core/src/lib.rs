//! Financial-inclusion index (AFI) and IPM simulation core.
//!
//! Leaves first: record → ratios → standardize/stats → index →
//! features → evaluation/comparator → pipeline/session.

pub mod comparator;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod index;
pub mod pipeline;
pub mod predictor;
pub mod ratios;
pub mod record;
pub mod session;
pub mod standardize;
pub mod stats;
pub mod store;
pub mod synthetic;
pub mod types;
