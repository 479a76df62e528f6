//! Rating aggregation module
//!
//! Maintains each recipe's derived average rating from its live review set.

pub mod aggregator;

pub use aggregator::{RatingAggregator, RatingError, RatingSummary};
