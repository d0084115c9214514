//! Actix middleware applied to every request.

pub mod trace;

pub use trace::Trace;
