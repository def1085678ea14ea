//! Goodfellows Match - donor/recipient matching service for the Goodfellows program
//!
//! This library filters approved families against a donor's preferences,
//! assigns a family to exactly one donor, runs the admin approval workflow
//! and keeps each child's wishlist.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{filter_eligible, is_eligible, MatchError, Matchmaker};
pub use models::{DonorPreference, Principal, RecipientRecord, Role, Wishlist};
pub use services::{IdentityProvider, MemoryProfileStore, PostgresProfileStore, ProfileStore};
