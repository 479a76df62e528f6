//! Brewbook Library
//!
//! Core functionality for sharing and reviewing coffee recipes.

pub mod build_info;
pub mod db;
pub mod ingredients;
pub mod mcp;
pub mod models;
pub mod rating;
pub mod tools;
pub mod units;
