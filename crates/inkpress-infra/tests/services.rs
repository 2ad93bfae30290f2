//! Core services driven against the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use inkpress_core::DomainError;
use inkpress_core::domain::{
    Author, Category, CategoryPatch, Comment, NewAuthor, NewCategory, NewComment, NewPost, NewTag, PostPatch,
    PostStatus,
};
use inkpress_core::ports::{BaseRepository, CommentRepository, Repositories};
use inkpress_core::services::{AuthorService, CommentService, PostService, TaxonomyService};
use inkpress_core::thread::CommentNode;
use inkpress_infra::InMemoryStore;
use uuid::Uuid;

struct Blog {
    store: Arc<InMemoryStore>,
    authors: AuthorService,
    taxonomy: TaxonomyService,
    posts: PostService,
    comments: CommentService,
}

impl Blog {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = Repositories::from_store(store.clone());
        Self {
            store,
            authors: AuthorService::new(repos.clone()),
            taxonomy: TaxonomyService::new(repos.clone()),
            posts: PostService::new(repos.clone()),
            comments: CommentService::new(repos),
        }
    }

    async fn author(&self, email: &str) -> Author {
        self.authors
            .create(NewAuthor {
                name: Some("Ada".to_string()),
                email: Some(email.to_string()),
                bio: Some("Writes things".to_string()),
            })
            .await
            .unwrap()
    }

    async fn category(&self, name: &str) -> Category {
        self.taxonomy
            .create_category(NewCategory {
                name: Some(name.to_string()),
                description: Some("About it".to_string()),
            })
            .await
            .unwrap()
            .category
    }

    async fn post(&self, title: &str, author: &Author, category: &Category, status: &str) -> Uuid {
        self.posts
            .create(NewPost {
                title: Some(title.to_string()),
                content: Some("Body".to_string()),
                author_id: Some(author.id),
                category_id: Some(category.id),
                tag_ids: Vec::new(),
                status: Some(status.to_string()),
            })
            .await
            .unwrap()
            .post
            .id
    }

    async fn comment(&self, post_id: Uuid, parent_id: Option<Uuid>) -> Result<CommentNode, DomainError> {
        self.comments
            .create(NewComment {
                post_id: Some(post_id),
                parent_id,
                author: Some("Reader".to_string()),
                author_email: Some("reader@example.com".to_string()),
                content: Some("Nice".to_string()),
            })
            .await
    }
}

#[tokio::test]
async fn test_comment_chain_stops_at_third_level() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("Threads", &author, &category, "published").await;

    let c1 = blog.comment(post, None).await.unwrap().comment;
    let c2 = blog.comment(post, Some(c1.id)).await.unwrap().comment;
    let c3 = blog.comment(post, Some(c2.id)).await.unwrap().comment;
    let c4 = blog.comment(post, Some(c3.id)).await;

    let errors = c4.unwrap_err().field_errors().unwrap();
    assert_eq!(
        errors.get("parent_comment").unwrap(),
        [DomainError::depth_exceeded().to_string()]
    );
    // A sibling at the second level is still fine.
    assert!(blog.comment(post, Some(c1.id)).await.is_ok());
}

#[tokio::test]
async fn test_reply_must_stay_on_the_same_post() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let first = blog.post("First", &author, &category, "draft").await;
    let second = blog.post("Second", &author, &category, "draft").await;

    let root = blog.comment(first, None).await.unwrap().comment;
    let err = blog.comment(second, Some(root.id)).await.unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.contains("parent_comment"));
}

#[tokio::test]
async fn test_comment_on_missing_post_is_rejected() {
    let blog = Blog::new();
    let err = blog.comment(Uuid::new_v4(), None).await.unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.get("post").unwrap()[0].starts_with("Invalid pk"));
}

#[tokio::test]
async fn test_thread_round_trip_matches_parent_links() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("Threads", &author, &category, "draft").await;

    let root = blog.comment(post, None).await.unwrap().comment;
    let a = blog.comment(post, Some(root.id)).await.unwrap().comment;
    let b = blog.comment(post, Some(root.id)).await.unwrap().comment;
    let a1 = blog.comment(post, Some(a.id)).await.unwrap().comment;

    let tree = blog.comments.thread(root.id).await.unwrap();
    assert_eq!(tree.len(), 4);
    let children: HashSet<Uuid> = tree.replies.iter().map(|r| r.comment.id).collect();
    assert_eq!(children, HashSet::from([a.id, b.id]));
    let under_a = tree.replies.iter().find(|r| r.comment.id == a.id).unwrap();
    assert_eq!(under_a.replies.len(), 1);
    assert_eq!(under_a.replies[0].comment.id, a1.id);

    let direct = blog.comments.replies_of(root.id).await.unwrap();
    assert_eq!(direct.len(), 2);
    assert!(direct.iter().all(|c| c.parent_id == Some(root.id)));
}

#[tokio::test]
async fn test_delete_comment_removes_replies() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("Threads", &author, &category, "draft").await;

    let root = blog.comment(post, None).await.unwrap().comment;
    let reply = blog.comment(post, Some(root.id)).await.unwrap().comment;
    blog.comment(post, Some(reply.id)).await.unwrap();
    let other = blog.comment(post, None).await.unwrap().comment;

    blog.comments.delete(root.id).await.unwrap();

    let left = blog.comments.list_by_post(post).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].comment.id, other.id);
    assert!(matches!(
        blog.comments.delete(root.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_post_cascades_to_comment_chains() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let doomed = blog.post("Doomed", &author, &category, "published").await;
    let kept = blog.post("Kept", &author, &category, "published").await;

    let c1 = blog.comment(doomed, None).await.unwrap().comment;
    let c2 = blog.comment(doomed, Some(c1.id)).await.unwrap().comment;
    blog.comment(doomed, Some(c2.id)).await.unwrap();
    blog.comment(kept, None).await.unwrap();

    blog.posts.delete("doomed").await.unwrap();

    let all = blog.comments.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].comment.post_id, kept);
    assert!(matches!(
        blog.posts.get("doomed").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_published_listing_excludes_drafts() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    blog.post("Live", &author, &category, "published").await;
    blog.post("Hidden", &author, &category, "draft").await;

    let page = blog.posts.list_published(1).await.unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items.iter().all(|v| v.post.status == PostStatus::Published));

    // Category and tag listings keep drafts.
    let in_category = blog.posts.in_category(category.id).await.unwrap();
    assert_eq!(in_category.len(), 2);
}

#[tokio::test]
async fn test_second_page_of_fifteen() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    for n in 0..15 {
        blog.post(&format!("Post {n}"), &author, &category, "published").await;
    }

    let first = blog.posts.list_published(1).await.unwrap();
    let second = blog.posts.list_published(2).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.total, 15);
    assert!(second.has_previous());
    assert!(!second.has_next());

    let firsts: HashSet<Uuid> = first.items.iter().map(|v| v.post.id).collect();
    assert!(second.items.iter().all(|v| !firsts.contains(&v.post.id)));

    let stamps: Vec<_> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|v| v.post.created_at)
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));

    assert!(matches!(
        blog.posts.list_published(3).await,
        Err(DomainError::InvalidPage(3))
    ));
    assert!(matches!(
        blog.posts.list_published(0).await,
        Err(DomainError::InvalidPage(0))
    ));
}

#[tokio::test]
async fn test_post_count_follows_inserts_and_deletes() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let rust = blog.category("Rust").await;
    let go = blog.category("Go").await;

    blog.post("One", &author, &rust, "draft").await;
    blog.post("Two", &author, &rust, "published").await;
    blog.post("Three", &author, &go, "draft").await;
    blog.posts.delete("one").await.unwrap();
    blog.post("Four", &author, &rust, "draft").await;

    let counts: Vec<(String, u64)> = blog
        .taxonomy
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|v| (v.category.slug, v.post_count))
        .collect();
    assert_eq!(counts, vec![("go".to_string(), 1), ("rust".to_string(), 2)]);
}

#[tokio::test]
async fn test_tag_counts_and_listing() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let tag = blog
        .taxonomy
        .create_tag(NewTag {
            name: Some("Async Rust".to_string()),
        })
        .await
        .unwrap()
        .tag;
    assert_eq!(tag.slug, "async-rust");

    let view = blog
        .posts
        .create(NewPost {
            title: Some("Tagged".to_string()),
            content: Some("Body".to_string()),
            author_id: Some(author.id),
            category_id: Some(category.id),
            tag_ids: vec![tag.id, tag.id],
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(view.post.tag_ids, vec![tag.id]);
    assert_eq!(view.tags[0].post_count, 1);
    assert_eq!(view.post.status, PostStatus::Draft);

    let tagged = blog.posts.with_tag(tag.id).await.unwrap();
    assert_eq!(tagged.len(), 1);

    BaseRepository::<inkpress_core::domain::Tag, Uuid>::delete(blog.store.as_ref(), tag.id)
        .await
        .unwrap();
    let post = blog.posts.find("tagged").await.unwrap();
    assert!(post.tag_ids.is_empty());
}

#[tokio::test]
async fn test_unknown_references_are_reported() {
    let blog = Blog::new();
    let missing_tag = Uuid::new_v4();
    let err = blog
        .posts
        .create(NewPost {
            title: Some("Orphan".to_string()),
            content: Some("Body".to_string()),
            author_id: Some(Uuid::new_v4()),
            category_id: Some(Uuid::new_v4()),
            tag_ids: vec![missing_tag],
            status: Some("published".to_string()),
        })
        .await
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert!(errors.contains("author"));
    assert!(errors.contains("category"));
    assert!(errors.get("tags").unwrap()[0].contains(&missing_tag.to_string()));
}

#[tokio::test]
async fn test_renaming_moves_slug() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    blog.post("First Draft", &author, &category, "draft").await;

    let untouched = blog
        .posts
        .update(
            "first-draft",
            PostPatch {
                content: Some("Edited".to_string()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.post.slug, "first-draft");

    let renamed = blog
        .posts
        .update(
            "first-draft",
            PostPatch {
                title: Some("Final Cut".to_string()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.post.slug, "final-cut");
    assert!(renamed.post.updated_at >= renamed.post.created_at);
    assert!(blog.posts.find("first-draft").await.is_err());

    let moved = blog
        .taxonomy
        .update_category(
            "rust",
            CategoryPatch {
                name: Some("Rust Lang".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category.slug, "rust-lang");
    assert_eq!(moved.post_count, 1);
}

#[tokio::test]
async fn test_duplicate_slugs_and_emails_are_rejected() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    blog.post("Same Title", &author, &category, "draft").await;

    let err = blog
        .posts
        .create(NewPost {
            title: Some("same title!".to_string()),
            content: Some("Body".to_string()),
            author_id: Some(author.id),
            category_id: Some(category.id),
            tag_ids: Vec::new(),
            status: None,
        })
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("slug"));

    let err = blog
        .taxonomy
        .create_category(NewCategory {
            name: Some("RUST".to_string()),
            description: Some("Again".to_string()),
        })
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("slug"));

    let err = blog
        .authors
        .create(NewAuthor {
            name: Some("Other".to_string()),
            email: Some("ada@example.com".to_string()),
            bio: Some("Also writes".to_string()),
        })
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("email"));
}

#[tokio::test]
async fn test_deleting_author_removes_their_posts() {
    let blog = Blog::new();
    let ada = blog.author("ada@example.com").await;
    let bob = blog.author("bob@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("By Ada", &ada, &category, "published").await;
    blog.post("By Bob", &bob, &category, "published").await;
    blog.comment(post, None).await.unwrap();

    BaseRepository::<Author, Uuid>::delete(blog.store.as_ref(), ada.id)
        .await
        .unwrap();

    let page = blog.posts.list_published(1).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].author.id, bob.id);
    assert!(blog.comments.list().await.unwrap().is_empty());
    assert_eq!(blog.authors.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_huge_page_number_is_invalid() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    blog.post("Only", &author, &category, "published").await;

    for page in [1_000_000, u64::MAX / 10, u64::MAX] {
        assert!(
            matches!(blog.posts.list_published(page).await, Err(DomainError::InvalidPage(p)) if p == page),
            "page {page}"
        );
    }
}

#[tokio::test]
async fn test_comment_cannot_outlive_deleted_post() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("Short lived", &author, &category, "published").await;
    let root = blog.comment(post, None).await.unwrap().comment;

    blog.posts.delete("short-lived").await.unwrap();

    // A write prepared before the delete landed.
    let late = Comment {
        id: Uuid::new_v4(),
        parent_id: Some(root.id),
        created_at: chrono::Utc::now(),
        ..root.clone()
    };
    let err: DomainError = BaseRepository::<Comment, Uuid>::save(blog.store.as_ref(), late)
        .await
        .unwrap_err()
        .into();
    assert!(err.field_errors().unwrap().contains("post"));

    let err = blog.comment(post, None).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("post"));
    assert!(CommentRepository::list(blog.store.as_ref()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reply_reports_every_bad_field() {
    let blog = Blog::new();
    let author = blog.author("ada@example.com").await;
    let category = blog.category("Rust").await;
    let post = blog.post("Threads", &author, &category, "published").await;

    let err = blog
        .comments
        .create(NewComment {
            post_id: Some(post),
            parent_id: Some(Uuid::new_v4()),
            author: Some("Reader".to_string()),
            author_email: Some("not-an-email".to_string()),
            content: Some("   ".to_string()),
        })
        .await
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    for field in ["parent_comment", "author_email", "content"] {
        assert!(errors.contains(field), "{field}");
    }

    let c1 = blog.comment(post, None).await.unwrap().comment;
    let c2 = blog.comment(post, Some(c1.id)).await.unwrap().comment;
    let c3 = blog.comment(post, Some(c2.id)).await.unwrap().comment;
    let err = blog
        .comments
        .create(NewComment {
            post_id: Some(post),
            parent_id: Some(c3.id),
            author: None,
            author_email: Some("reader@example.com".to_string()),
            content: Some("Too deep".to_string()),
        })
        .await
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.contains("parent_comment"));
    assert!(errors.contains("author"));
}
