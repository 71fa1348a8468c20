//! HTTP middleware components.
//!
//! Provides Basic authentication and front-end URL rewriting.

pub mod basic_auth;
pub mod rewrite;

pub use basic_auth::{Authenticated, authenticate_basic};
pub use rewrite::resolve_rewrites;
