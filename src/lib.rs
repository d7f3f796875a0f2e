//! Spherical world generation library
//!
//! Builds a triangulated globe, classifies land and sea, runs rivers and
//! winds across it, and classifies biomes. Re-exports modules for use by
//! binaries and tools.

pub mod biomes;
pub mod cell;
pub mod climate;
pub mod coords;
pub mod elevation;
pub mod error;
pub mod hull;
pub mod hydrology;
pub mod land;
pub mod landmass;
pub mod map_export;
pub mod mesh;
pub mod noise_field;
pub mod params;
pub mod persistence;
pub mod sections;
pub mod seeds;
pub mod world;

pub use error::{Result, WorldError};
pub use params::GenerationParams;
pub use world::World;
