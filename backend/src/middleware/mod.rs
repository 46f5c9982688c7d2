//! Request middleware.
//!
//! Purpose: per-request concerns that sit in front of every handler. Today
//! that is trace-id assignment.

pub mod trace;

pub use trace::Trace;
