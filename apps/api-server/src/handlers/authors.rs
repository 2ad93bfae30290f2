//! Author handlers.

use actix_web::{HttpResponse, web};
use inkpress_core::domain::NewAuthor;
use inkpress_shared::dto::{AuthorResponse, CreateAuthorRequest};

use super::presenter;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /authors/
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state.authors.list().await?;
    let body: Vec<AuthorResponse> = authors.into_iter().map(presenter::author).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /authors/
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateAuthorRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let author = state
        .authors
        .create(NewAuthor {
            name: req.name,
            email: req.email,
            bio: req.bio,
        })
        .await?;
    Ok(HttpResponse::Created().json(presenter::author(author)))
}
