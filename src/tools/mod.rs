//! Brewbook tools module
//!
//! MCP tool implementations for the Brewbook recipe service.

pub mod recipes;
pub mod reviews;
pub mod status;
pub mod units;
