//! # Utilities Module
//!
//! Grid geometry and path finding shared by generation, visibility and AI.

pub mod geometry;
pub mod navigation;

pub use geometry::*;
pub use navigation::*;
