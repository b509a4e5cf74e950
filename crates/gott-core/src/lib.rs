//! Core domain logic for gott.
//!
//! This crate contains the fundamental types and logic for:
//! - Intervals: the tracked unit and its token classification
//! - Filters: the `:today` / `:week` / `YYYY-MM-DD` filter mini-language
//! - Edit documents: the bracketed text format used for bulk edits

pub mod calendar;
pub mod duration;
pub mod edit;
pub mod filter;
mod interval;
mod types;

pub use duration::DurationParseError;
pub use edit::{EditError, ReconcilePlan, plan_reconcile};
pub use filter::{Filter, FilterError, FilterKeyword, Predicate};
pub use interval::{Interval, PROJECT_PREFIX, PROJECT_PREFIX_SHORT, REF_PREFIX, TAG_PREFIX};
pub use types::{IntervalId, ValidationError};
