//! Image inspection module

pub mod processor;

pub use processor::{DecodedDimensions, ImageInspector};
