//! Request middleware.
//!
//! [`Trace`] assigns each request a trace id, wraps the handler in a
//! `request` span and echoes the id in the `trace-id` response header.
//! Authentication is an extractor, not middleware; see
//! [`crate::inbound::http::auth`].

pub mod trace;

pub use trace::Trace;
