//! Post handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use inkpress_core::domain::{NewPost, PostPatch};
use inkpress_shared::dto::{CreatePostRequest, PageQuery, UpdatePostRequest};

use super::presenter;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /posts/?page=N
pub async fn list_published(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list_published(query.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(presenter::page(&req, page, presenter::post)))
}

/// POST /posts/
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title,
        content: req.content,
        author_id: req.author,
        category_id: req.category,
        tag_ids: req.tags,
        status: req.status,
    };

    let view = state.posts.create(input).await?;
    Ok(HttpResponse::Created().json(presenter::post(view)))
}

/// GET /posts/{slug}/
pub async fn get(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    let view = state.posts.get(&slug).await?;
    Ok(HttpResponse::Ok().json(presenter::post(view)))
}

/// PUT /posts/{slug}/
pub async fn update(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        author_id: req.author,
        category_id: req.category,
        tag_ids: req.tags,
        status: req.status,
    };

    let view = state.posts.update(&slug, patch).await?;
    Ok(HttpResponse::Ok().json(presenter::post(view)))
}

/// DELETE /posts/{slug}/
pub async fn delete(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    state.posts.delete(&slug).await?;
    Ok(HttpResponse::NoContent().finish())
}
