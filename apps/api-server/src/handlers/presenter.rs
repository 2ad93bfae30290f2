//! Core views to wire DTOs.

use actix_web::HttpRequest;
use inkpress_core::domain::Author;
use inkpress_core::ports::Page;
use inkpress_core::projection::{CategoryView, PostView, TagView};
use inkpress_core::thread::CommentNode;
use inkpress_shared::PaginatedResponse;
use inkpress_shared::dto::{
    AuthorResponse, CategoryResponse, CommentResponse, PostResponse, TagResponse,
};

pub fn author(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        name: author.name,
        email: author.email,
        bio: author.bio,
    }
}

pub fn category(view: CategoryView) -> CategoryResponse {
    CategoryResponse {
        id: view.category.id,
        name: view.category.name,
        slug: view.category.slug,
        description: view.category.description,
        post_count: view.post_count,
    }
}

pub fn tag(view: TagView) -> TagResponse {
    TagResponse {
        id: view.tag.id,
        name: view.tag.name,
        slug: view.tag.slug,
        post_count: view.post_count,
    }
}

pub fn post(view: PostView) -> PostResponse {
    PostResponse {
        id: view.post.id,
        title: view.post.title,
        slug: view.post.slug,
        content: view.post.content,
        author: author(view.author),
        category: category(view.category),
        tags: view.tags.into_iter().map(tag).collect(),
        created_at: view.post.created_at,
        updated_at: view.post.updated_at,
        status: view.post.status.to_string(),
        comments_count: view.comments_count,
    }
}

pub fn comment(node: CommentNode) -> CommentResponse {
    CommentResponse {
        id: node.comment.id,
        post: node.comment.post_id,
        author: node.comment.author,
        created_at: node.comment.created_at,
        author_email: node.comment.author_email,
        content: node.comment.content,
        parent_comment: node.comment.parent_id,
        replies: node.replies.into_iter().map(comment).collect(),
    }
}

/// Page envelope with absolute links to the neighbouring pages.
pub fn page<T, U>(req: &HttpRequest, page: Page<T>, present: impl Fn(T) -> U) -> PaginatedResponse<U> {
    let next = page.has_next().then(|| page_url(req, page.page + 1));
    let previous = page.has_previous().then(|| page_url(req, page.page - 1));
    PaginatedResponse {
        count: page.total,
        next,
        previous,
        results: page.items.into_iter().map(present).collect(),
    }
}

/// Link to `page` of the current path. The first page carries no query.
fn page_url(req: &HttpRequest, page: u64) -> String {
    let info = req.connection_info();
    let base = format!("{}://{}{}", info.scheme(), info.host(), req.path());
    if page == 1 {
        base
    } else {
        format!("{base}?page={page}")
    }
}
