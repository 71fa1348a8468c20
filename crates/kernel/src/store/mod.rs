//! Post and media storage.
//!
//! The kernel talks to storage through [`PostStore`]; [`MemoryStore`] keeps
//! everything in process memory.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::PostStore;
