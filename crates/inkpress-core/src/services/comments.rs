use uuid::Uuid;

use crate::domain::{Comment, NewComment};
use crate::error::{DomainError, RepoError};
use crate::ports::Repositories;
use crate::thread::{CommentNode, DepthProbe, ThreadIndex};
use crate::validation::FieldErrors;

use super::missing_reference;

/// Comment thread engine: write-time nesting checks and read-time reply trees.
#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a comment on an existing post, optionally as a reply.
    ///
    /// A reply must target a comment on the same post and may not go deeper
    /// than [`MAX_THREAD_DEPTH`](crate::thread::MAX_THREAD_DEPTH).
    pub async fn create(&self, input: NewComment) -> Result<CommentNode, DomainError> {
        let mut errors = FieldErrors::new();
        let parent = match input.parent_id {
            Some(parent_id) => match self.validate_parent(parent_id).await {
                Ok(parent) => Some(parent),
                Err(err) => {
                    let fields = err.field_errors().ok_or(err)?;
                    errors.merge(fields);
                    None
                }
            },
            None => None,
        };

        if let Some(post_id) = input.post_id {
            if self.repos.posts.find_by_id(post_id).await?.is_none() {
                errors.add("post", missing_reference(post_id));
            } else if parent.as_ref().is_some_and(|p| p.post_id != post_id) {
                errors.add("parent_comment", "Reply must belong to the same post.");
            }
        }
        let comment = errors.absorb(Comment::new(input));
        let comment = errors.finish(comment)?;

        let comment = self.repos.comments.save(comment).await?;
        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            parent_id = ?comment.parent_id,
            "Comment created"
        );
        Ok(CommentNode::leaf(comment))
    }

    /// Load `parent_id` and make sure a reply to it stays within the nesting limit.
    ///
    /// The walk starts at the parent (level 1) and climbs until it reaches a
    /// root comment.
    pub async fn validate_parent(&self, parent_id: Uuid) -> Result<Comment, DomainError> {
        let parent = self
            .repos
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(FieldErrors::single(
                    "parent_comment",
                    missing_reference(parent_id),
                ))
            })?;

        let mut probe = DepthProbe::new();
        let mut cursor = parent.parent_id;
        while let Some(ancestor_id) = cursor {
            probe.ascend()?;
            let Some(ancestor) = self.repos.comments.find_by_id(ancestor_id).await? else {
                break;
            };
            cursor = ancestor.parent_id;
        }

        Ok(parent)
    }

    /// Direct replies, oldest first.
    pub async fn replies_of(&self, comment_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self.repos.comments.replies_of(comment_id).await?)
    }

    /// The comment with its full reply tree.
    pub async fn thread(&self, comment_id: Uuid) -> Result<CommentNode, DomainError> {
        let comment = self
            .repos
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        let siblings = self.repos.comments.list_by_post(comment.post_id).await?;
        Ok(ThreadIndex::new(&siblings).build(&comment))
    }

    /// Every comment, each carrying its own replies.
    pub async fn list(&self) -> Result<Vec<CommentNode>, DomainError> {
        let comments = self.repos.comments.list().await?;
        Ok(expand(&comments))
    }

    /// Every comment on the post, each carrying its own replies.
    pub async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<CommentNode>, DomainError> {
        let comments = self.repos.comments.list_by_post(post_id).await?;
        Ok(expand(&comments))
    }

    /// Delete the comment and all replies below it.
    pub async fn delete(&self, comment_id: Uuid) -> Result<(), DomainError> {
        match self.repos.comments.delete(comment_id).await {
            Ok(()) => {
                tracing::info!(comment_id = %comment_id, "Comment deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => {
                Err(DomainError::not_found("Comment", comment_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Threads for every comment in `comments`, listed in their stored order.
fn expand(comments: &[Comment]) -> Vec<CommentNode> {
    let index = ThreadIndex::new(comments);
    comments.iter().map(|comment| index.build(comment)).collect()
}
