//! Comment grouping and doc/line comment association.
//!
//! Comments are grouped the way Go tooling groups them: adjacent comments with
//! no blank line and no token between them form one group, and a comment that
//! trails a token on its line starts a group confined to that line.

use crate::position::PositionTable;

use super::{Comment, CommentGroup, Span};

#[derive(Debug)]
struct Grouped {
    group: CommentGroup,
    span: Span,
    start_line: usize,
    end_line: usize,
    /// First comment of the group follows a token on the same line.
    trailing: bool,
}

/// All comment groups of one source, indexed for association with nodes.
#[derive(Debug)]
pub struct CommentIndex<'a> {
    source: &'a str,
    groups: Vec<Grouped>,
}

impl<'a> CommentIndex<'a> {
    /// Groups `comments`, which must be sorted by start offset.
    pub fn build(source: &'a str, comments: Vec<Comment>, table: &PositionTable) -> Self {
        let mut groups: Vec<Grouped> = Vec::new();

        for comment in comments {
            let start_line = table.line_of(comment.span.start);
            let end_line = table.line_of(comment.span.end.saturating_sub(1).max(comment.span.start));
            let trailing = trails_token(source, comment.span.start, groups.last());

            let joins = match groups.last() {
                Some(current) if !trailing => {
                    let gap_is_blank = source
                        .get(current.span.end..comment.span.start)
                        .is_some_and(|gap| gap.trim().is_empty());
                    let limit = if current.trailing { 0 } else { 1 };
                    gap_is_blank && start_line <= current.end_line + limit
                }
                _ => false,
            };

            match groups.last_mut() {
                Some(current) if joins => {
                    current.span = current.span.to(comment.span);
                    current.end_line = end_line;
                    current.group.list.push(comment);
                }
                _ => groups.push(Grouped {
                    span: comment.span,
                    start_line,
                    end_line,
                    trailing,
                    group: CommentGroup {
                        list: vec![comment],
                    },
                }),
            }
        }

        tracing::trace!(groups = groups.len(), "grouped comments");
        Self { source, groups }
    }

    /// The group documenting a node that starts at `start`: it ends on the
    /// line just before the node, starts on its own line, and nothing but
    /// whitespace separates it from the node.
    pub fn doc_for(&self, start: usize, table: &PositionTable) -> Option<CommentGroup> {
        let line = table.line_of(start);
        self.groups
            .iter()
            .rev()
            .find(|g| g.span.end <= start)
            .filter(|g| !g.trailing && g.end_line + 1 == line)
            .filter(|g| self.only_whitespace(g.span.end, start))
            .map(|g| g.group.clone())
    }

    /// The group trailing a node that ends at `end` on the same line.
    pub fn line_comment_for(&self, end: usize, table: &PositionTable) -> Option<CommentGroup> {
        let line = table.line_of(end);
        self.groups
            .iter()
            .find(|g| g.span.start >= end)
            .filter(|g| g.trailing && g.start_line == line)
            .filter(|g| {
                self.source
                    .get(end..g.span.start)
                    .is_some_and(|gap| gap.chars().all(|c| c.is_whitespace() || c == ';'))
            })
            .map(|g| g.group.clone())
    }

    pub fn into_groups(self) -> Vec<CommentGroup> {
        self.groups.into_iter().map(|g| g.group).collect()
    }

    fn only_whitespace(&self, from: usize, to: usize) -> bool {
        self.source
            .get(from..to)
            .is_some_and(|gap| gap.trim().is_empty())
    }
}

/// True when something other than whitespace, or the previous comment,
/// precedes `start` on its line.
fn trails_token(source: &str, start: usize, previous: Option<&Grouped>) -> bool {
    let before = source.get(..start).unwrap_or("");
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let prefix_start = match previous {
        Some(prev) if prev.span.end > line_start && prev.span.end <= start => prev.span.end,
        _ => line_start,
    };
    !before[prefix_start..].trim().is_empty()
}
