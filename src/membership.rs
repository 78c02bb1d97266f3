use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::config::READ_BUFFER_SIZE;
use crate::error::{AuditError, Result};
use crate::graph_io::{is_comment, LineContext};
use crate::types::graph_numeric::VertexId;
use crate::util::progress_spinner;

pub mod comm_idx;

/// How a membership file is laid out.
#[derive(Clone, Copy, Debug, Default)]
pub struct MembershipOptions {
    /// Lines are `vertex community` pairs. Otherwise line N holds the community of vertex N - 1.
    pub keyed: bool,
    /// Index origin of the file. Subtracted from vertex keys and community ids.
    pub start: usize,
    pub show_progress: bool,
}

/// Community assignment of every vertex in `[0, span)`.
///
/// Built once by [`read_membership`] (or [`Membership::from_vec`]) and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership<K> {
    /// Community id of each vertex, indexed by vertex id.
    communities: Vec<K>,
}

impl<K> Membership<K>
where
    K: VertexId
{
    pub fn from_vec(communities: Vec<K>) -> Self {
        Self { communities }
    }

    /// Number of vertices covered, equal to the span of the graph it was loaded for.
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Returns the community of a vertex, or `None` if the vertex is outside the span.
    #[inline]
    pub fn community_of(&self, vertex_id: &K) -> Option<K> {
        self.communities.get(vertex_id.index()).copied()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.communities
    }
}

/// Reads a membership file for a graph of the given span.
pub fn read_membership<K>(path: &Path, span: usize, options: &MembershipOptions) -> Result<Membership<K>>
where
    K: VertexId
{
    let file = File::open(path).map_err(|source| AuditError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let membership = read_membership_from(reader, span, options, &path.display().to_string())?;
    info!(vertices = membership.len(), keyed = options.keyed, "membership loaded from {}", path.display());
    Ok(membership)
}

/// Reads a membership from any buffered stream.
///
/// # Format
/// - keyed: `vertex community` per line; vertex `v` becomes `v - start`
/// - positional: `community` per line; the N-th data line is vertex `N - 1`
///
/// In both layouts a community `c` becomes `c - start`, so keyed and
/// positional files with the same origin describe the same assignment.
/// Blank lines and `#`/`%` comment lines are skipped.
///
/// # Errors
/// - [`AuditError::Range`] when a vertex falls outside `[0, span)`
/// - [`AuditError::UndefinedCommunity`] when a vertex of the span gets no community
/// - [`AuditError::Parse`] for malformed lines or ids below `start`
pub fn read_membership_from<R, K>(
    reader: R,
    span: usize,
    options: &MembershipOptions,
    input: &str,
) -> Result<Membership<K>>
where
    R: BufRead,
    K: VertexId
{
    let start = options.start;
    let mut assigned: Vec<Option<K>> = vec![None; span];
    let mut next_position = 0usize;
    let pb = progress_spinner(format!("Reading {input}"), options.show_progress);

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        pb.inc(1);
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        let ctx = LineContext { input, line: line_index + 1 };
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let required = if options.keyed { 2 } else { 1 };
        if fields.len() < required {
            return Err(ctx.error(format!(
                "expected at least {required} columns, found {}",
                fields.len()
            )));
        }

        let (vertex, community_token) = if options.keyed {
            let key = ctx.parse_count(fields[0])?;
            if key < start {
                return Err(AuditError::Range {
                    line: ctx.line,
                    vertex: key as u64,
                    span,
                });
            }
            (key - start, fields[1])
        } else {
            let position = next_position;
            next_position += 1;
            (position, fields[0])
        };

        let community_raw = ctx.parse_count(community_token)?;
        if community_raw < start {
            return Err(ctx.error(format!(
                "community id {community_raw} is below the membership start {start}"
            )));
        }
        let community = K::from_index(community_raw - start).ok_or_else(|| {
            ctx.error(format!("community id {community_raw} does not fit the id type"))
        })?;

        let Some(slot) = assigned.get_mut(vertex) else {
            return Err(AuditError::Range {
                line: ctx.line,
                vertex: (vertex + if options.keyed { start } else { 0 }) as u64,
                span,
            });
        };
        if let Some(previous) = slot.replace(community) {
            debug!(vertex, previous = %previous, community = %community, "membership reassigned");
        }
    }
    pb.finish_and_clear();

    let mut communities = Vec::with_capacity(span);
    for (vertex, community) in assigned.into_iter().enumerate() {
        match community {
            Some(community) => communities.push(community),
            None => return Err(AuditError::UndefinedCommunity { vertex: vertex as u64 }),
        }
    }
    Ok(Membership::from_vec(communities))
}

#[cfg(test)]
mod test_membership {
    use super::*;

    fn read(text: &str, span: usize, keyed: bool, start: usize) -> Result<Membership<u32>> {
        let options = MembershipOptions { keyed, start, show_progress: false };
        read_membership_from(text.as_bytes(), span, &options, "inline")
    }

    #[test]
    fn test_positional_zero_based() {
        let membership = read("0\n0\n\n1\n", 3, false, 0).unwrap();
        assert_eq!(membership.as_slice(), &[0, 0, 1]);
        assert_eq!(membership.community_of(&2), Some(1));
        assert_eq!(membership.community_of(&3), None);
    }

    #[test]
    fn test_keyed_any_order() {
        let membership = read("2 5\n0 5\n1 3\n", 3, true, 0).unwrap();
        assert_eq!(membership.as_slice(), &[5, 3, 5]);
    }

    /// A keyed and a positional file describing the same assignment with a
    /// 1-based origin must load identically.
    #[test]
    fn test_keyed_and_positional_agree_with_start_one() {
        let keyed = read("1 1\n2 1\n3 2\n4 2\n", 4, true, 1).unwrap();
        let positional = read("1\n1\n2\n2\n", 4, false, 1).unwrap();
        assert_eq!(keyed, positional);
        assert_eq!(keyed.as_slice(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_keyed_reassignment_last_wins() {
        let membership = read("0 1\n1 1\n0 2\n", 2, true, 0).unwrap();
        assert_eq!(membership.as_slice(), &[2, 1]);
    }

    #[test]
    fn test_out_of_range_vertex_fails() {
        let err = read("0 0\n1 0\n5 0\n", 2, true, 0).unwrap_err();
        match err {
            AuditError::Range { line, vertex, span } => {
                assert_eq!((line, vertex, span), (3, 5, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = read("0\n0\n0\n", 2, false, 0).unwrap_err();
        assert!(matches!(err, AuditError::Range { line: 3, vertex: 2, .. }));

        let err = read("0 1\n", 2, true, 1).unwrap_err();
        assert!(matches!(err, AuditError::Range { line: 1, vertex: 0, .. }));
    }

    #[test]
    fn test_missing_vertex_is_undefined() {
        let err = read("0 0\n2 0\n", 3, true, 0).unwrap_err();
        assert!(matches!(err, AuditError::UndefinedCommunity { vertex: 1 }));

        let err = read("4\n", 2, false, 0).unwrap_err();
        assert!(matches!(err, AuditError::UndefinedCommunity { vertex: 1 }));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(read("0\nx\n", 2, false, 0), Err(AuditError::Parse { line: 2, .. })));
        assert!(matches!(read("0\n", 1, true, 0), Err(AuditError::Parse { line: 1, .. })));
        assert!(matches!(read("0\n", 1, false, 1), Err(AuditError::Parse { line: 1, .. })));
        assert!(matches!(read("-1\n", 1, false, 0), Err(AuditError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_empty_span() {
        let membership = read("# nothing\n", 0, false, 0).unwrap();
        assert!(membership.is_empty());
    }
}
