//! # AgroStack
//!
//! Umbrella crate for the AgroStack price engine. It re-exports the
//! workspace members so downstream code can depend on a single crate.
//!
//! ## Example
//!
//! ```
//! use agrostack_workspace::price::FusionWeights;
//!
//! let weights = FusionWeights::default();
//! assert!((weights.combine(2600.0, 2400.0) - 2540.0).abs() < 1e-9);
//! ```

pub use agro_math as math;
pub use agro_price as price;

/// Version of the workspace facade
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
