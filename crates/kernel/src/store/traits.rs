use crate::models::{Media, Post};

/// Storage backend for posts and media attachments.
///
/// Implementations assign ids and must be safe to share across request tasks.
pub trait PostStore: Send + Sync + 'static {
    /// Store a new post, replacing `post.id` with a freshly assigned id.
    fn insert_post(&self, post: Post) -> Post;

    fn get_post(&self, id: u64) -> Option<Post>;

    /// Replace an existing post. Returns `false` if the id is unknown.
    fn update_post(&self, post: Post) -> bool;

    fn remove_post(&self, id: u64) -> Option<Post>;

    /// All posts of a type, in id order.
    fn posts_of_type(&self, post_type: &str) -> Vec<Post>;

    /// Store a new attachment, replacing `media.id` with a freshly assigned id.
    fn insert_media(&self, media: Media) -> Media;

    fn media_by_file(&self, file: &str) -> Option<Media>;

    fn media_count(&self) -> usize;
}
