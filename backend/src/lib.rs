//! # RESTORANG backend
//!
//! Price tier classification and ranking engine for restaurant prices across
//! the districts of a city, with the data sources and HTTP API around it.
//!
//! ## Features
//!
//! - **Tiers**: percentile cut points and `€`/`€€`/`€€€` classification of restaurants
//! - **Filtering**: search-as-you-type restaurant table with a tier filter
//! - **Districts**: per-district summaries, min/max and best value rankings
//! - **Trends**: price history of a single item at a restaurant
//! - **Sources**: mock fixtures, Supabase RPC functions or the Django JSON API
//! - **HTTP API**: RESTful endpoints for the frontend
//!
//! ## Architecture
//!
//! - [`models`]: rows, summaries and catalog types shared by every layer
//! - [`engine`]: pure, synchronous computations over a snapshot
//! - [`sources`]: the [`sources::PriceSource`] trait, its implementations and configuration
//! - [`services`]: compare, trend and moderation services used by the handlers
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use restorang::engine::{classify, compute_thresholds, Tier};
//! use restorang::models::PriceObservation;
//!
//! let rows: Vec<PriceObservation> = (4..=9i64)
//!     .map(|p| PriceObservation::new(p, format!("R{}", p), "Centar", Some(p as f64), 1))
//!     .collect();
//! let thresholds = compute_thresholds(&rows);
//!
//! assert_eq!(classify(5.0, &thresholds), Some(Tier::Low));
//! assert_eq!(classify(8.0, &thresholds), Some(Tier::High));
//! ```

// SourceError carries a structured context for debugging
#![allow(clippy::result_large_err)]

pub mod engine;
pub mod models;
pub mod services;
pub mod sources;

#[cfg(feature = "http-server")]
pub mod http;
