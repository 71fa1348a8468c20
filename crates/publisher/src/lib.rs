//! Wordepress publisher.
//!
//! Renders a tree of markdown documents to HTML and keeps a site's
//! documentation or tutorials posts in line with it through the REST API.

pub mod api;
pub mod cli;
pub mod error;
pub mod image;
pub mod observer;
pub mod parse;
pub mod post;
pub mod render;
pub mod site;
pub mod slug;
pub mod sync;
pub mod target;
pub mod template;

pub use error::{PublishError, Result};
