//! Core data models for the team balancer.

mod match_record;
mod player;
mod rank;
mod role;
mod team;

pub use match_record::*;
pub use player::*;
pub use rank::*;
pub use role::*;
pub use team::*;
