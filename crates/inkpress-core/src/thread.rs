//! Comment threads: nesting limits, reply trees and cascade sets.
//!
//! Comments are kept as an arena keyed by id. Each record stores only its
//! parent id; children are found through [`ThreadIndex`], never through
//! owned pointers.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Comment;
use crate::error::DomainError;

/// Deepest allowed reply chain: comment, reply, reply-to-reply.
pub const MAX_THREAD_DEPTH: usize = 3;

/// Counts levels while walking up from a prospective parent.
///
/// The parent itself is level 1 and every ancestor above it adds one. The
/// walk fails as soon as the count reaches [`MAX_THREAD_DEPTH`], so a reply
/// to a comment that already has two ancestors is refused.
#[derive(Debug)]
pub struct DepthProbe {
    level: usize,
}

impl DepthProbe {
    pub fn new() -> Self {
        Self { level: 1 }
    }

    /// Record one more ancestor above the current position.
    pub fn ascend(&mut self) -> Result<(), DomainError> {
        self.level += 1;
        if self.level >= MAX_THREAD_DEPTH {
            return Err(DomainError::depth_exceeded());
        }
        Ok(())
    }
}

impl Default for DepthProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// A comment together with its replies, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of comments in this subtree, the root included.
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::len).sum::<usize>()
    }
}

/// Parent/child adjacency over a set of comments.
pub struct ThreadIndex<'a> {
    by_id: HashMap<Uuid, &'a Comment>,
    children: HashMap<Uuid, Vec<&'a Comment>>,
    roots: Vec<&'a Comment>,
}

impl<'a> ThreadIndex<'a> {
    /// Index `comments`. Siblings are ordered oldest first.
    ///
    /// A comment whose parent is not in the set is treated as a root.
    pub fn new<I>(comments: I) -> Self
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let by_id: HashMap<Uuid, &'a Comment> = comments.into_iter().map(|c| (c.id, c)).collect();
        let mut children: HashMap<Uuid, Vec<&'a Comment>> = HashMap::new();
        let mut roots = Vec::new();

        for comment in by_id.values().copied() {
            match comment.parent_id {
                Some(parent) if by_id.contains_key(&parent) => {
                    children.entry(parent).or_default().push(comment);
                }
                _ => roots.push(comment),
            }
        }

        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| chronological(a, b));
        }
        roots.sort_by(|a, b| chronological(a, b));

        Self {
            by_id,
            children,
            roots,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Comment> {
        self.by_id.get(&id).copied()
    }

    /// Direct replies to `id`, oldest first.
    pub fn replies_of(&self, id: Uuid) -> &[&'a Comment] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[&'a Comment] {
        &self.roots
    }

    /// Attach replies to `comment` and to every reply below it.
    ///
    /// Depth is whatever the data holds. The nesting limit is enforced when
    /// comments are written, not here.
    pub fn build(&self, comment: &Comment) -> CommentNode {
        CommentNode {
            comment: comment.clone(),
            replies: self
                .replies_of(comment.id)
                .iter()
                .map(|reply| self.build(reply))
                .collect(),
        }
    }

    /// Every top-level comment with its replies.
    pub fn forest(&self) -> Vec<CommentNode> {
        self.roots.iter().map(|root| self.build(root)).collect()
    }

    /// Ids reachable from `roots` through reply links, the roots included.
    pub fn subtree(&self, roots: &[Uuid]) -> HashSet<Uuid> {
        let mut reached = HashSet::new();
        let mut stack: Vec<Uuid> = roots.to_vec();

        while let Some(id) = stack.pop() {
            if !reached.insert(id) {
                continue;
            }
            stack.extend(self.replies_of(id).iter().map(|reply| reply.id));
        }

        reached
    }
}

fn chronological(a: &Comment, b: &Comment) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn comment(post_id: Uuid, parent: Option<&Comment>, minutes: i64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id,
            parent_id: parent.map(|p| p.id),
            author: "Reader".to_string(),
            author_email: "reader@example.com".to_string(),
            content: format!("at {minutes}"),
            created_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    fn probe_for(index: &ThreadIndex<'_>, parent: &Comment) -> Result<(), DomainError> {
        let mut probe = DepthProbe::new();
        let mut cursor = parent.parent_id;
        while let Some(id) = cursor {
            probe.ascend()?;
            cursor = index.get(id).and_then(|c| c.parent_id);
        }
        Ok(())
    }

    #[test]
    fn test_depth_rule() {
        let post = Uuid::new_v4();
        let c1 = comment(post, None, 0);
        let c2 = comment(post, Some(&c1), 1);
        let c3 = comment(post, Some(&c2), 2);
        let all = vec![c1.clone(), c2.clone(), c3.clone()];
        let index = ThreadIndex::new(&all);

        assert!(probe_for(&index, &c1).is_ok());
        assert!(probe_for(&index, &c2).is_ok());
        assert!(matches!(
            probe_for(&index, &c3),
            Err(DomainError::DepthExceeded { max_depth: 3 })
        ));
    }

    #[test]
    fn test_build_nests_replies_in_order() {
        let post = Uuid::new_v4();
        let root = comment(post, None, 0);
        let late = comment(post, Some(&root), 5);
        let early = comment(post, Some(&root), 1);
        let nested = comment(post, Some(&early), 2);
        let all = vec![late.clone(), nested.clone(), root.clone(), early.clone()];
        let index = ThreadIndex::new(&all);

        let tree = index.build(&root);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.replies[0].comment.id, early.id);
        assert_eq!(tree.replies[1].comment.id, late.id);
        assert_eq!(tree.replies[0].replies[0].comment.id, nested.id);
        assert!(tree.replies[1].replies.is_empty());
    }

    #[test]
    fn test_build_is_not_capped() {
        let post = Uuid::new_v4();
        let mut chain = vec![comment(post, None, 0)];
        for minute in 1..6 {
            let next = comment(post, chain.last(), minute);
            chain.push(next);
        }
        let index = ThreadIndex::new(&chain);
        assert_eq!(index.build(&chain[0]).len(), 6);
        assert_eq!(index.get(chain[5].id).unwrap().parent_id, Some(chain[4].id));
    }

    #[test]
    fn test_subtree() {
        let post = Uuid::new_v4();
        let a = comment(post, None, 0);
        let b = comment(post, Some(&a), 1);
        let c = comment(post, Some(&b), 2);
        let other = comment(post, None, 3);
        let all = vec![a.clone(), b.clone(), c.clone(), other.clone()];
        let index = ThreadIndex::new(&all);

        let reached = index.subtree(&[b.id]);
        assert_eq!(reached, HashSet::from([b.id, c.id]));

        let everything = index.subtree(&[a.id, other.id]);
        assert_eq!(everything.len(), 4);
    }

    #[test]
    fn test_orphans_become_roots() {
        let post = Uuid::new_v4();
        let gone = comment(post, None, 0);
        let orphan = comment(post, Some(&gone), 1);
        let all = vec![orphan.clone()];
        let index = ThreadIndex::new(&all);
        assert_eq!(index.roots().len(), 1);
        assert_eq!(index.forest()[0].comment.id, orphan.id);
    }
}
