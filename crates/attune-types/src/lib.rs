//! Shared domain types for Attune.
//!
//! This crate contains the domain types used across the Attune workspace:
//! memories, conversation threads, routing decisions, assessments, profiles,
//! model request/response shapes, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod assessment;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod profile;
pub mod routing;
