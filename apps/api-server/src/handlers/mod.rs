//! HTTP handlers and route configuration.

mod authors;
mod comments;
mod health;
mod posts;
mod presenter;
mod taxonomy;

use actix_web::web;

use crate::middleware::error::{json_error_handler, query_error_handler};
use crate::state::AppState;

/// Shared state, extractor error handlers and routes for one app instance.
pub fn configure_app(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(configure_routes);
    }
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/")
                        .route(web::get().to(posts::list_published))
                        .route(web::post().to(posts::create)),
                )
                // Literal comment routes before the slug routes
                .service(
                    web::resource("/comments/")
                        .route(web::get().to(comments::list))
                        .route(web::post().to(comments::create)),
                )
                .route("/comments/{id}/", web::delete().to(comments::delete))
                .service(
                    web::resource("/{slug}/")
                        .route(web::get().to(posts::get))
                        .route(web::put().to(posts::update))
                        .route(web::delete().to(posts::delete)),
                )
                .route("/{post_slug}/comments/", web::get().to(comments::list_for_post)),
        )
        .service(
            web::scope("/categories")
                .service(
                    web::resource("/")
                        .route(web::get().to(taxonomy::list_categories))
                        .route(web::post().to(taxonomy::create_category)),
                )
                .route("/{slug}/", web::put().to(taxonomy::update_category))
                .route("/{slug}/posts/", web::get().to(taxonomy::category_posts)),
        )
        .service(
            web::scope("/tags")
                .service(
                    web::resource("/")
                        .route(web::get().to(taxonomy::list_tags))
                        .route(web::post().to(taxonomy::create_tag)),
                )
                .route("/{slug}/", web::put().to(taxonomy::update_tag))
                .route("/{slug}/posts/", web::get().to(taxonomy::tag_posts)),
        )
        .service(
            web::scope("/authors").service(
                web::resource("/")
                    .route(web::get().to(authors::list))
                    .route(web::post().to(authors::create)),
            ),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use super::configure_app;
    use crate::state::AppState;

    macro_rules! app {
        () => {
            test::init_service(App::new().configure(configure_app(web::Data::new(
                AppState::in_memory(),
            ))))
            .await
        };
    }

    /// Send the request and decode the body, `Null` when empty.
    macro_rules! call {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body = test::read_body(resp).await;
            let json: Value = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body).unwrap()
            };
            (status, json)
        }};
    }

    macro_rules! post_json {
        ($app:expr, $uri:expr, $body:expr) => {
            call!($app, test::TestRequest::post().uri($uri).set_json($body))
        };
    }

    macro_rules! get {
        ($app:expr, $uri:expr) => {
            call!($app, test::TestRequest::get().uri($uri))
        };
    }

    /// An author and a category, returned as their ids.
    macro_rules! seed {
        ($app:expr) => {{
            let (status, author) = post_json!(
                $app,
                "/authors/",
                json!({"name": "Ada", "email": "ada@example.com", "bio": "Writes"})
            );
            assert_eq!(status, StatusCode::CREATED);
            let (status, category) = post_json!(
                $app,
                "/categories/",
                json!({"name": "Rust Tips", "description": "Short notes"})
            );
            assert_eq!(status, StatusCode::CREATED);
            (author["id"].clone(), category["id"].clone())
        }};
    }

    #[actix_rt::test]
    async fn test_health_check() {
        let app = app!();
        let (status, body) = get!(app, "/health");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[actix_rt::test]
    async fn test_create_post_nests_related_records() {
        let app = app!();
        let (author, category) = seed!(app);
        let (_, tag) = post_json!(app, "/tags/", json!({"name": "Async"}));

        let (status, post) = post_json!(
            app,
            "/posts/",
            json!({
                "title": "Hello, World!",
                "content": "First post",
                "author": author,
                "category": category,
                "tags": [tag["id"]],
                "status": "published"
            })
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["slug"], "hello-world");
        assert_eq!(post["author"]["name"], "Ada");
        assert_eq!(post["category"]["slug"], "rust-tips");
        assert_eq!(post["category"]["post_count"], 1);
        assert_eq!(post["tags"][0]["slug"], "async");
        assert_eq!(post["tags"][0]["post_count"], 1);
        assert_eq!(post["comments_count"], 0);

        let (status, fetched) = get!(app, "/posts/hello-world/");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], post["id"]);

        let (_, by_tag) = get!(app, "/tags/async/posts/");
        assert_eq!(by_tag.as_array().unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_missing_fields_are_reported_per_field() {
        let app = app!();
        let (status, body) = post_json!(app, "/posts/", json!({}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        for field in ["title", "content", "author", "category"] {
            assert_eq!(body["errors"][field][0], "This field is required.", "{field}");
        }
    }

    #[actix_rt::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app!();
        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/authors/")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[actix_rt::test]
    async fn test_update_post_title_moves_slug() {
        let app = app!();
        let (author, category) = seed!(app);
        post_json!(
            app,
            "/posts/",
            json!({"title": "Old Name", "content": "x", "author": author, "category": category})
        );

        let (status, updated) = call!(
            app,
            test::TestRequest::put()
                .uri("/posts/old-name/")
                .set_json(json!({"title": "New Name"}))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["slug"], "new-name");
        assert_eq!(updated["status"], "draft");

        let (status, _) = get!(app, "/posts/old-name/");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_comment_depth_limit() {
        let app = app!();
        let (author, category) = seed!(app);
        let (_, post) = post_json!(
            app,
            "/posts/",
            json!({"title": "Thread", "content": "x", "author": author, "category": category})
        );

        let mut parent = Value::Null;
        let mut statuses = Vec::new();
        let mut last = Value::Null;
        for n in 1..=4 {
            let (status, body) = post_json!(
                app,
                "/posts/comments/",
                json!({
                    "post": post["id"],
                    "author": format!("Reader {n}"),
                    "author_email": "reader@example.com",
                    "content": "reply",
                    "parent_comment": parent
                })
            );
            statuses.push(status);
            if status == StatusCode::CREATED {
                parent = body["id"].clone();
            }
            last = body;
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::CREATED,
                StatusCode::CREATED,
                StatusCode::CREATED,
                StatusCode::BAD_REQUEST
            ]
        );
        assert!(last["errors"]["parent_comment"].is_array());

        let (status, threads) = get!(app, "/posts/thread/comments/");
        assert_eq!(status, StatusCode::OK);
        let threads = threads.as_array().unwrap();
        assert_eq!(threads.len(), 3);
        let root = threads
            .iter()
            .find(|c| c["parent_comment"].is_null())
            .unwrap();
        assert_eq!(root["replies"][0]["replies"].as_array().unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_comments_route_is_not_a_post_slug() {
        let app = app!();
        let (status, body) = get!(app, "/posts/comments/");
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_published_listing_pages() {
        let app = app!();
        let (author, category) = seed!(app);
        for n in 0..15 {
            post_json!(
                app,
                "/posts/",
                json!({
                    "title": format!("Post {n}"),
                    "content": "x",
                    "author": author,
                    "category": category,
                    "status": "published"
                })
            );
        }
        post_json!(
            app,
            "/posts/",
            json!({"title": "Draft", "content": "x", "author": author, "category": category})
        );

        let (status, first) = get!(app, "/posts/");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["count"], 15);
        assert_eq!(first["results"].as_array().unwrap().len(), 10);
        assert!(first["previous"].is_null());
        assert!(first["next"].as_str().unwrap().ends_with("/posts/?page=2"));

        let (_, second) = get!(app, "/posts/?page=2");
        assert_eq!(second["results"].as_array().unwrap().len(), 5);
        assert!(second["next"].is_null());
        assert!(second["previous"].as_str().unwrap().ends_with("/posts/"));
        assert!(
            second["results"]
                .as_array()
                .unwrap()
                .iter()
                .all(|p| p["status"] == "published")
        );

        let (status, body) = get!(app, "/posts/?page=3");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Invalid page.");
    }

    #[actix_rt::test]
    async fn test_delete_post_removes_comments() {
        let app = app!();
        let (author, category) = seed!(app);
        let (_, post) = post_json!(
            app,
            "/posts/",
            json!({"title": "Gone", "content": "x", "author": author, "category": category})
        );
        let (_, root) = post_json!(
            app,
            "/posts/comments/",
            json!({"post": post["id"], "author": "A", "author_email": "a@example.com", "content": "hi"})
        );
        post_json!(
            app,
            "/posts/comments/",
            json!({
                "post": post["id"],
                "author": "B",
                "author_email": "b@example.com",
                "content": "re",
                "parent_comment": root["id"]
            })
        );

        let (status, body) = call!(app, test::TestRequest::delete().uri("/posts/gone/"));
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _) = get!(app, "/posts/gone/");
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, comments) = get!(app, "/posts/comments/");
        assert!(comments.as_array().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_duplicate_category_is_rejected() {
        let app = app!();
        seed!(app);
        let (status, body) = post_json!(
            app,
            "/categories/",
            json!({"name": "rust tips", "description": "again"})
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["slug"].is_array());
    }
}
