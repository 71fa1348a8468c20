//! HTTP route handlers.

pub mod front;
pub mod health;
pub mod helpers;
pub mod media;
pub mod plugin_admin;
pub mod posts;
