//! Category and tag handlers.

use actix_web::{HttpResponse, web};
use inkpress_core::domain::{CategoryPatch, NewCategory, NewTag, TagPatch};
use inkpress_shared::dto::{
    CategoryResponse, CreateCategoryRequest, CreateTagRequest, PostResponse, TagResponse,
    UpdateCategoryRequest, UpdateTagRequest,
};

use super::presenter;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /categories/
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let views = state.taxonomy.list_categories().await?;
    let body: Vec<CategoryResponse> = views.into_iter().map(presenter::category).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /categories/
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let view = state
        .taxonomy
        .create_category(NewCategory {
            name: req.name,
            description: req.description,
        })
        .await?;
    Ok(HttpResponse::Created().json(presenter::category(view)))
}

/// PUT /categories/{slug}/
pub async fn update_category(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = CategoryPatch {
        name: req.name,
        description: req.description,
    };
    let view = state.taxonomy.update_category(&slug, patch).await?;
    Ok(HttpResponse::Ok().json(presenter::category(view)))
}

/// GET /categories/{slug}/posts/
pub async fn category_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let category = state.taxonomy.category(&slug).await?;
    let views = state.posts.in_category(category.id).await?;
    let body: Vec<PostResponse> = views.into_iter().map(presenter::post).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /tags/
pub async fn list_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let views = state.taxonomy.list_tags().await?;
    let body: Vec<TagResponse> = views.into_iter().map(presenter::tag).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /tags/
pub async fn create_tag(
    state: web::Data<AppState>,
    body: web::Json<CreateTagRequest>,
) -> AppResult<HttpResponse> {
    let view = state
        .taxonomy
        .create_tag(NewTag {
            name: body.into_inner().name,
        })
        .await?;
    Ok(HttpResponse::Created().json(presenter::tag(view)))
}

/// PUT /tags/{slug}/
pub async fn update_tag(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    body: web::Json<UpdateTagRequest>,
) -> AppResult<HttpResponse> {
    let patch = TagPatch {
        name: body.into_inner().name,
    };
    let view = state.taxonomy.update_tag(&slug, patch).await?;
    Ok(HttpResponse::Ok().json(presenter::tag(view)))
}

/// GET /tags/{slug}/posts/
pub async fn tag_posts(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    let tag = state.taxonomy.tag(&slug).await?;
    let views = state.posts.with_tag(tag.id).await?;
    let body: Vec<PostResponse> = views.into_iter().map(presenter::post).collect();
    Ok(HttpResponse::Ok().json(body))
}
