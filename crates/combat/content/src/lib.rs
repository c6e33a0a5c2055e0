//! Data-driven combat content and loaders.
//!
//! This crate houses the shipped maneuver catalog and provides loaders for
//! RON/TOML data files:
//! - Maneuver definitions (standard, martial-arts, weapon) in RON
//! - Combat rules configuration in TOML
//!
//! All loaders deserialize combat-core types directly with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, ManeuverLoader};
