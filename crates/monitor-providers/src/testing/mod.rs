//! Test doubles for the provider traits.
//!
//! Canned providers that return fixed results or errors, optionally after a
//! delay, and record every call they receive. Used by the pipeline tests and
//! handy for exercising the aggregator without network access.

mod mock;

pub use mock::{MockCall, StaticIssueTracker, StaticSourceControl};
