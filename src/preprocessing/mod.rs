//! Image preprocessing module
//!
//! Turns encoded image bytes (JPEG, PNG, BMP, ...) into the fixed-shape
//! NHWC tensor the classifier expects:
//! - Decode to an RGB pixel grid
//! - Resize to exactly 224x224 (no crop, no aspect preservation)
//! - Scale every channel from 0-255 to 0.0-1.0
//! - Add a leading batch dimension of 1

mod decoder;

pub use decoder::{decode, ImageDecoder, ImageTensor};

/// Side length of the square model input
pub const INPUT_SIZE: usize = 224;

/// Number of color channels in the model input (RGB)
pub const INPUT_CHANNELS: usize = 3;

/// Full model input shape: batch, height, width, channels
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS];
