//! Shared utilities for the Fleet Tracker backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Great-circle distance math
//! - Common validation logic

pub mod geo;
pub mod validation;
