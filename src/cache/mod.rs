//! Prediction caching
//!
//! A single-entry cache for the most recently received image and the
//! prediction derived from it.

mod session;

pub use session::{SessionCache, SessionSnapshot, StoredImage};
