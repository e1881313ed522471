//! Estimates annual solar energy lost to shading from nearby obstructions on roof planes.
//!
//! The simulation engine ([`manager_shading::ShadingEngine`]) walks a representative time grid,
//! projects 2D obstruction shadows for each sun position and compares shaded against unshaded
//! clear-sky production. [`manager_proximity::ProximityEngine`] is a coarse, location free
//! fallback based on distance and height bands only.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod irradiance;
pub mod manager_proximity;
pub mod manager_shading;
pub mod models;
pub mod sampling;
pub mod shadow;
pub mod solar_position;
