//! Object classification helpers and the pluggable accessor pair.
//!
//! The classification predicates decide what the sibling-merge machinery may
//! and may not merge; `safe_get`/`safe_set` are the default deep-path
//! accessors over `serde_json::Value`.

use crate::error::{ChangesetError, ChangesetResult};
use crate::Path;
use serde_json::{Map, Value};

/// Check whether a value is a plain mergeable object.
///
/// Arrays and null are not mergeable: they are treated as atomic values and
/// replaced wholesale.
#[inline]
pub fn is_mergeable(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// Check whether a sub-object stands in for a to-one association.
///
/// A to-one reference carries both a `type` and an `id` key (the resource
/// identifier shape). Such objects must keep their identity and are excluded
/// from sibling merging.
#[inline]
pub fn is_to_one_reference(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("type") && obj.contains_key("id"))
}

/// Shallow-merge two objects, with `overlay` winning on key conflicts.
pub fn shallow_merge(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut out = base.clone();
    for (key, value) in overlay {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Read a value at a path, cloning it out.
///
/// Numeric segments index into arrays. Returns `None` if any segment does
/// not resolve.
pub fn safe_get(obj: &Value, path: &Path) -> Option<Value> {
    let mut current = obj;
    for seg in path.iter() {
        current = match current {
            Value::Object(map) => map.get(seg)?,
            Value::Array(arr) => arr.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

/// Write a value at a path, creating intermediate objects as needed.
///
/// Existing non-object intermediates are replaced by fresh objects. Array
/// elements can be overwritten through numeric segments, but writing past
/// the end of an array is an error.
pub fn safe_set(obj: &mut Value, path: &Path, value: Value) -> ChangesetResult<()> {
    if path.is_empty() {
        *obj = value;
        return Ok(());
    }
    set_segments(obj, path.segments(), value, path)
}

fn set_segments(
    current: &mut Value,
    segments: &[String],
    value: Value,
    full_path: &Path,
) -> ChangesetResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        *current = value;
        return Ok(());
    };

    if let Value::Array(arr) = current {
        let index: usize = head.parse().map_err(|_| {
            ChangesetError::type_mismatch(full_path.clone(), "object", "array")
        })?;
        if index >= arr.len() {
            return Err(ChangesetError::index_out_of_bounds(
                full_path.clone(),
                index,
                arr.len(),
            ));
        }
        return if rest.is_empty() {
            arr[index] = value;
            Ok(())
        } else {
            set_segments(&mut arr[index], rest, value, full_path)
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    let map = current.as_object_mut().unwrap();

    if rest.is_empty() {
        map.insert(head.clone(), value);
        Ok(())
    } else {
        let entry = map.entry(head.clone()).or_insert(Value::Null);
        set_segments(entry, rest, value, full_path)
    }
}

/// Pluggable deep-path read/write pair.
///
/// The store and the merge routine go through this trait for every content
/// access, so a host object model with its own property semantics can be
/// substituted for the default JSON walker.
pub trait Accessor: Send + Sync {
    /// Read the value at `path`, cloning it out.
    fn safe_get(&self, obj: &Value, path: &Path) -> Option<Value>;

    /// Write `value` at `path`.
    fn safe_set(&self, obj: &mut Value, path: &Path, value: Value) -> ChangesetResult<()>;
}

/// Default accessor over plain `serde_json::Value` trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAccessor;

impl Accessor for JsonAccessor {
    fn safe_get(&self, obj: &Value, path: &Path) -> Option<Value> {
        safe_get(obj, path)
    }

    fn safe_set(&self, obj: &mut Value, path: &Path, value: Value) -> ChangesetResult<()> {
        safe_set(obj, path, value)
    }
}
