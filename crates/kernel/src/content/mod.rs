//! Content management module.
//!
//! This module provides:
//! - PostTypeRegistry: post type descriptors and their REST exposure
//! - RestFieldRegistry: plugin-registered REST fields with accessors
//! - PostService: CRUD, slugs, trash and page-path lookup
//! - MediaService: attachment uploads with unique file names
//! - PostQuery: list parameters and `filter[...]` query vars

pub mod media_service;
mod post_service;
pub mod query;
mod rest_fields;
pub mod slug;
mod type_registry;

pub use media_service::MediaService;
pub use post_service::PostService;
pub use query::{DEFAULT_QUERY_VARS, PostQuery};
pub use rest_fields::RestFieldRegistry;
pub use type_registry::PostTypeRegistry;
