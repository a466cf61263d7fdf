//! # Team Balancer
//!
//! Builds ranked player profiles from a game-data provider and splits
//! custom-game rosters into two balanced teams.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (ranks, roles, profiles, teams)
//! - **calculate**: Rank scoring and match-stat aggregation
//! - **cache**: TTL key-value store used cache-aside
//! - **fetch**: Data provider client and error taxonomy
//! - **profile**: Cached profile and stats assembly
//! - **optimizer**: Remote team-optimizer client
//! - **balance**: Roster partitioning with local fallback
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod balance;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod optimizer;
pub mod profile;

pub use models::*;
