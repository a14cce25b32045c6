//! Render pipelines.
//!
//! - `basic` holds the shared pipeline builder
//! - `phong` is the lit pipeline for textured models
//! - `light` draws unlit markers where the lights are

pub mod basic;
pub mod light;
pub mod phong;
