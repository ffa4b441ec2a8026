//! Credential sources for the rotating key pools.
//!
//! - `env`: process environment, optionally primed from `.env` files

pub mod env;
