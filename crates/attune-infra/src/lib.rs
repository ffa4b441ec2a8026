//! Infrastructure layer for Attune.
//!
//! Contains implementations of the traits defined in `attune-core`: SQLite
//! storage (memories, threads, assessments, profiles, credential counters),
//! the Gemini and NVIDIA model providers, the environment credential source,
//! and the `config.toml` loader.

pub mod config;
pub mod credential;
pub mod llm;
pub mod sqlite;
