//! Content models.

pub mod media;
pub mod post;

pub use media::Media;
pub use post::{CreatePost, Post, PostStatus, UpdatePost};
