//! Indented text rendering of a comment forest.

use crate::ooxml::threads::record::{CommentForest, CommentRecord};
use std::io::{self, Write};

const INDENT: &str = "    ";

/// Write persons, then each container's threads.
///
/// ```text
/// - User {P1} = Alice
/// Comments from Sheet1
/// - Comment {C1}: A1 at 2023-01-02T03:04:05.060Z by Alice
/// | "Check this"
///     - Comment {C2}: A1 at 2023-01-02T04:00:00.000Z by Alice [done]
///       "Done"
/// ```
pub fn dump<W: Write>(forest: &CommentForest, out: &mut W) -> io::Result<()> {
    for person in forest.persons.values() {
        writeln!(out, "- User {} = {}", person.id, person.display_name)?;
    }

    for container in forest.containers.iter().filter(|c| !c.roots.is_empty()) {
        writeln!(out, "Comments from {}", container.name)?;
        for root in &container.roots {
            dump_comment(forest, root, 0, out)?;
        }
    }

    Ok(())
}

fn dump_comment<W: Write>(
    forest: &CommentForest,
    comment: &CommentRecord,
    depth: usize,
    out: &mut W,
) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    write!(
        out,
        "{}- Comment {}: {} at {} by {}",
        indent,
        comment.id,
        comment.reference,
        comment.timestamp,
        forest.display_name(&comment.author_id)
    )?;
    if comment.done {
        write!(out, " [done]")?;
    }
    writeln!(out)?;

    let text = serde_json::to_string(&comment.text).map_err(io::Error::other)?;
    let marker = if comment.replies().is_empty() { ' ' } else { '|' };
    writeln!(out, "{}{} {}", indent, marker, text)?;

    for reply in comment.replies() {
        dump_comment(forest, reply, depth + 1, out)?;
    }
    Ok(())
}
