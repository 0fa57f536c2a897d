// src/coins/mod.rs
//! Coin catalog and profitability selection
//!
//! - The catalog is the fixed set of coins this deployment mines, with
//!   their fees and resolved launch arguments
//! - The selector turns a ranked feed into the single most profitable
//!   supported coin

/// Supported coin table
pub mod catalog;

/// Net revenue computation and best-coin selection
pub mod selector;

pub use self::catalog::{CoinCatalog, CoinEntry};
pub use self::selector::{CoinRevenue, SelectionResult, select};
