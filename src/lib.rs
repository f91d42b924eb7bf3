//! City generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod buildings;
pub mod config;
pub mod erosion;
pub mod error;
pub mod map_export;
pub mod neighborhoods;
pub mod pathfinding;
pub mod road_network;
pub mod seeds;
pub mod terrain;
pub mod tilemap;
pub mod units;
pub mod world;
pub mod zoning;

pub use config::CityConfig;
pub use error::{CityError, Result};
pub use seeds::WorldSeeds;
pub use world::{generate_world, WorldData};
