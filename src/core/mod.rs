// Core matching and assignment exports
pub mod approval;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod parsing;
pub mod registration;
pub mod wishlist;

pub use approval::ApprovalState;
pub use error::MatchError;
pub use filters::{filter_eligible, is_eligible, matches_age_range, matches_capacity, matches_gender};
pub use matcher::{EligibilityResult, Matchmaker};
pub use parsing::{parse_age_range, parse_ages};
pub use registration::validate_application;
pub use wishlist::empty_wishlists;
