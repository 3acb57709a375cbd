//! Shared types for the restaurant back-office core
//!
//! Common types used across the workspace: order commands, events and
//! snapshots, kitchen ticket types, restaurant models, and error codes.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};
