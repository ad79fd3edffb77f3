//! Pulling a JSON array out of a free-text model reply.
//!
//! Models often wrap the array in prose or a code fence. The whole trimmed
//! reply is tried first as strict JSON; failing that, every `[` is tried as
//! the start of a balanced-bracket slice (string literals and escapes are
//! skipped while counting depth). The first slice holding records (objects
//! or strings) wins, so a citation marker like `[1]` in the prose does not
//! shadow the real answer. Failing that an empty array is used, and any
//! other array only as the last resort.

use serde_json::Value;

/// The first JSON array found in `text`, or `None`.
pub fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    let trimmed = text.trim();

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
        return Some(items);
    }

    let mut empty = None;
    let mut fallback = None;
    for (start, _) in trimmed.match_indices('[') {
        let Some(end) = balanced_end(&trimmed[start..]) else {
            continue;
        };
        let slice = &trimmed[start..start + end];
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(slice) {
            if holds_records(&items) {
                return Some(items);
            }
            if items.is_empty() {
                empty.get_or_insert(items);
            } else {
                fallback.get_or_insert(items);
            }
        }
    }

    empty.or(fallback)
}

fn holds_records(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(|v| v.is_object() || v.is_string())
}

/// Byte length of the balanced `[...]` slice at the start of `text`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
