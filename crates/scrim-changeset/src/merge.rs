//! Deep merge of staged changes into content.
//!
//! The merge walks the source object key by key through the pluggable
//! accessor pair, recursing only where both sides are plain mergeable
//! objects. Everything else, arrays included, is written wholesale.

use crate::object::{is_mergeable, Accessor};
use crate::{ChangesetResult, Path};
use serde_json::{Map, Value};

/// Deep-merge `source` into `dest` through the given accessor.
///
/// For every key in `source`: when both the destination and source values
/// are plain mergeable objects, the merge recurses; otherwise the source
/// value overwrites the destination wholesale. Arrays are atomic and are
/// never merged element by element. Returns the mutated destination.
///
/// # Examples
///
/// ```
/// use scrim_changeset::{merge_deep, JsonAccessor};
/// use serde_json::json;
///
/// let mut dest = json!({"user": {"name": "A", "email": "a@x.com"}, "tags": ["a"]});
/// let source = json!({"user": {"name": "B"}, "tags": ["c"]});
///
/// merge_deep(&mut dest, &source, &JsonAccessor).unwrap();
/// assert_eq!(dest, json!({"user": {"name": "B", "email": "a@x.com"}, "tags": ["c"]}));
/// ```
pub fn merge_deep<'a>(
    dest: &'a mut Value,
    source: &Value,
    accessor: &dyn Accessor,
) -> ChangesetResult<&'a mut Value> {
    match source.as_object() {
        Some(entries) => merge_at(dest, &Path::root(), entries, accessor)?,
        None => *dest = source.clone(),
    }
    Ok(dest)
}

fn merge_at(
    dest: &mut Value,
    base: &Path,
    source: &Map<String, Value>,
    accessor: &dyn Accessor,
) -> ChangesetResult<()> {
    for (key, incoming) in source {
        let path = base.child(key);
        let existing = accessor.safe_get(dest, &path);
        match incoming.as_object() {
            Some(nested) if existing.as_ref().is_some_and(is_mergeable) => {
                merge_at(dest, &path, nested, accessor)?;
            }
            _ => accessor.safe_set(dest, &path, incoming.clone())?,
        }
    }
    Ok(())
}
