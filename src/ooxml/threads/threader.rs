//! Assembly of flat comment records into reply trees.
//!
//! Records are indexed by id and attached to their parent by index, so the tree is
//! only materialized once every parent reference has been checked. A reply to an
//! unknown comment and a chain of parents that loops back are both fatal.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::threads::record::CommentRecord;
use std::collections::HashMap;

/// Build the thread roots of one container.
///
/// Roots and replies keep the order of `comments`.
///
/// # Errors
/// - [`OoxmlError::DuplicateComment`] when two records share an id
/// - [`OoxmlError::OrphanComment`] when a parent id matches no record
/// - [`OoxmlError::CommentCycle`] when a record is its own ancestor
pub fn thread(container: &str, comments: Vec<CommentRecord>) -> Result<Vec<CommentRecord>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (i, comment) in comments.iter().enumerate() {
        if index.insert(comment.id.as_str(), i).is_some() {
            return Err(OoxmlError::DuplicateComment {
                container: container.to_string(),
                id: comment.id.clone(),
            });
        }
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    for (i, comment) in comments.iter().enumerate() {
        if comment.is_root() {
            roots.push(i);
            continue;
        }
        match index.get(comment.parent_id.as_str()) {
            Some(&parent) => children[parent].push(i),
            None => {
                return Err(OoxmlError::OrphanComment {
                    id: comment.id.clone(),
                    parent_id: comment.parent_id.clone(),
                });
            },
        }
    }

    // Every record has a known parent at this point, so anything not reachable from
    // a root hangs off a cycle.
    let mut reached = vec![false; comments.len()];
    let mut stack = roots.clone();
    while let Some(i) = stack.pop() {
        reached[i] = true;
        stack.extend(children[i].iter().copied());
    }
    if let Some(i) = reached.iter().position(|r| !r) {
        return Err(OoxmlError::CommentCycle {
            id: comments[i].id.clone(),
        });
    }

    // Post-order, so every reply is complete before it moves into its parent.
    let mut order = Vec::with_capacity(comments.len());
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&i| (i, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            order.push(i);
            continue;
        }
        stack.push((i, true));
        stack.extend(children[i].iter().rev().map(|&child| (child, false)));
    }

    let mut slots: Vec<Option<CommentRecord>> = comments.into_iter().map(Some).collect();
    for i in order {
        if children[i].is_empty() {
            continue;
        }
        let replies = children[i]
            .iter()
            .map(|&child| take(&mut slots, child))
            .collect::<Result<Vec<_>>>()?;
        if let Some(record) = slots[i].as_mut() {
            record.children = Some(replies);
        }
    }

    roots.iter().map(|&i| take(&mut slots, i)).collect()
}

fn take(slots: &mut [Option<CommentRecord>], i: usize) -> Result<CommentRecord> {
    slots[i]
        .take()
        .ok_or_else(|| OoxmlError::Other(format!("comment at position {} reached twice", i)))
}
