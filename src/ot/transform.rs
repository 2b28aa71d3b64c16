use super::{AcceptedOperation, Operation};

/// Rebase `op` against the ordered suffix of accepted history its author has
/// not yet seen, so that it applies correctly to the current content.
///
/// Each already-accepted operation adjusts the incoming operation's position
/// cumulatively, in history order. Simultaneous inserts at the same position
/// are ordered by author id: the author whose id compares greater is shifted
/// right, so all replicas pick the same ordering regardless of arrival order.
pub fn transform(mut op: Operation, author_id: &str, history: &[AcceptedOperation]) -> Operation {
    for accepted in history {
        op = transform_pair(op, author_id, &accepted.operation, &accepted.author_id);
    }
    op
}

fn transform_pair(
    op: Operation,
    author_id: &str,
    applied: &Operation,
    applied_author: &str,
) -> Operation {
    match (op, applied) {
        (
            Operation::Insert { position, text },
            Operation::Insert {
                position: pos_a,
                text: text_a,
            },
        ) => {
            let position = if position > *pos_a || (position == *pos_a && author_id > applied_author)
            {
                position + char_len(text_a)
            } else {
                position
            };
            Operation::Insert { position, text }
        }
        (
            Operation::Insert { position, text },
            Operation::Delete {
                position: pos_a,
                length: len_a,
            },
        ) => {
            let position = if position > *pos_a {
                position - (*len_a).min(position - *pos_a)
            } else {
                position
            };
            Operation::Insert { position, text }
        }
        (
            Operation::Delete { position, length },
            Operation::Insert {
                position: pos_a,
                text: text_a,
            },
        ) => {
            let position = if position >= *pos_a {
                position + char_len(text_a)
            } else {
                position
            };
            Operation::Delete { position, length }
        }
        (
            Operation::Delete { position, length },
            Operation::Delete {
                position: pos_a,
                length: len_a,
            },
        ) => {
            // The length is left untouched even when the two delete ranges
            // overlap, so a transformed delete may reference characters the
            // applied delete already removed; apply() clamps to content
            // bounds. Carried over from the original transform rules.
            let position = if position > *pos_a {
                position - (*len_a).min(position - *pos_a)
            } else {
                position
            };
            Operation::Delete { position, length }
        }
    }
}

/// Apply an already-transformed operation to the content in place.
///
/// Positions and lengths are clamped to the content bounds: an insert past
/// the end appends, a delete never removes past the last character.
pub fn apply(content: &mut String, op: &Operation) {
    match op {
        Operation::Insert { position, text } => {
            let at = byte_offset(content, *position);
            content.insert_str(at, text);
        }
        Operation::Delete { position, length } => {
            let start = byte_offset(content, *position);
            let end = byte_offset(content, position + length);
            content.replace_range(start..end, "");
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `chars`-th character, clamped to the end of the string.
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(at, _)| at)
        .unwrap_or(s.len())
}
