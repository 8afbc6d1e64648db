//! Core traits for pagewheel
//!
//! This module defines the abstract interfaces the core depends on.
//!
//! - [`Display`]: Sink that shows or clears the current address
//! - [`Fetcher`]: Retrieve a document by URI

pub mod display;
pub mod fetcher;

pub use display::Display;
pub use fetcher::{FetchResponse, Fetcher};
