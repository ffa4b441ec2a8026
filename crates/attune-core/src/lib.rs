//! Business logic and repository trait definitions for Attune.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements. It depends only on `attune-types` --
//! never on `attune-infra` or any database/IO crate.

pub mod agent;
pub mod chat;
pub mod decode;
pub mod llm;
pub mod memory;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
