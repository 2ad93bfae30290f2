//! Comment handlers.

use actix_web::{HttpResponse, web};
use inkpress_core::domain::NewComment;
use inkpress_shared::dto::{CommentResponse, CreateCommentRequest};
use uuid::Uuid;

use super::presenter;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /posts/comments/
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let threads = state.comments.list().await?;
    let body: Vec<CommentResponse> = threads.into_iter().map(presenter::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /posts/comments/
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewComment {
        post_id: req.post,
        parent_id: req.parent_comment,
        author: req.author,
        author_email: req.author_email,
        content: req.content,
    };

    let node = state.comments.create(input).await?;
    Ok(HttpResponse::Created().json(presenter::comment(node)))
}

/// DELETE /posts/comments/{id}/
pub async fn delete(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    state.comments.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /posts/{post_slug}/comments/
pub async fn list_for_post(
    state: web::Data<AppState>,
    post_slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.find(&post_slug).await?;
    let threads = state.comments.list_by_post(post.id).await?;
    let body: Vec<CommentResponse> = threads.into_iter().map(presenter::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}
