//! API Routes
//!
//! Route handlers organized by functionality.

pub mod entries;
pub mod health;
pub mod patterns;
