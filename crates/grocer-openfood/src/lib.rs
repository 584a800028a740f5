//! Client for the Open Food Facts product database.
//!
//! Exposes exact barcode lookup and free-text search, returning products
//! normalized into [`OffProduct`]. Transient HTTP failures are retried with
//! exponential back-off; everything else surfaces as [`OpenFoodError`].

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

mod retry;

pub use client::OpenFoodClient;
pub use error::OpenFoodError;
pub use normalize::{normalize_product, OffProduct};
