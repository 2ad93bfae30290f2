//! Domain entities - the core business objects.

mod author;
mod category;
mod comment;
mod post;
mod tag;

pub use author::{Author, NewAuthor};
pub use category::{Category, CategoryPatch, NewCategory};
pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostPatch, PostStatus, RESERVED_SLUGS};
pub use tag::{NewTag, Tag, TagPatch};
