//! Utility functions for image processing
//!
//! - Grayscale conversion of stride-aware RGB buffers
//! - Inversion and nearest-neighbour upscaling for decode retries

pub mod grayscale;
