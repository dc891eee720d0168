//! The buffered store.
//!
//! `Changeset` owns the three overlapping namespaces a read resolves
//! against: the staged-change tree, the validation-errors map, and the
//! shared content cell. Writes land in the buffer after validation; the
//! content object is only touched by `execute`.

use crate::change::ChangeTree;
use crate::content::ContentCell;
use crate::error::{value_type_name, ChangesetError, ChangesetResult};
use crate::merge::merge_deep;
use crate::notify::{Notifier, NullNotifier};
use crate::object::{self, Accessor, JsonAccessor};
use crate::validate::{AlwaysValid, Validation, ValidationError, Validator};
use crate::Path;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Names of the internal maps `delete_key` can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InternalMap {
    /// The staged-change tree.
    Changes,
    /// The validation-errors map.
    Errors,
}

impl InternalMap {
    /// The key name used in notifications for this map.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            InternalMap::Changes => "changes",
            InternalMap::Errors => "errors",
        }
    }
}

/// Construction options.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangesetOptions {
    /// Bypass the validator entirely; every `set` is recorded as passing.
    pub skip_validate: bool,
}

/// A staging buffer in front of a plain content object.
///
/// Reads resolve staged changes first, then the store's own aggregate
/// views, then the underlying content. Writes are validated and recorded
/// in the buffer; `execute` reconciles the buffer into the content via a
/// deep merge once the store is valid and dirty.
pub struct Changeset {
    id: String,
    content: ContentCell,
    changes: ChangeTree,
    errors: BTreeMap<String, ValidationError>,
    validator: Arc<dyn Validator>,
    notifier: Arc<dyn Notifier>,
    accessor: Arc<dyn Accessor>,
    options: ChangesetOptions,
}

impl Changeset {
    /// Start building a changeset over the given content.
    pub fn builder(content: impl Into<Value>) -> ChangesetBuilder {
        ChangesetBuilder::new(content)
    }

    /// The identifier passed to the notifier as the mutation target.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle to the underlying content. Clones share the same value.
    pub fn content(&self) -> ContentCell {
        self.content.clone()
    }

    /// True when no validation errors are pending.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when at least one change is staged.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The staged changes as a plain nested object, leaves unwrapped.
    pub fn changes(&self) -> Value {
        self.changes.normalize()
    }

    /// The pending validation errors, keyed by dotted path.
    pub fn errors(&self) -> &BTreeMap<String, ValidationError> {
        &self.errors
    }

    /// The pending error for a path, if any.
    pub fn error(&self, path: impl Into<Path>) -> Option<&ValidationError> {
        self.errors.get(&path.into().to_string())
    }

    /// Stage a value at a dotted path after validating it.
    ///
    /// On a passing outcome the change is recorded (clearing any prior
    /// error for the exact path) and observers are notified for `changes`
    /// and for the path. On a failing outcome an error record is stored
    /// (clearing any staged change for the path, so a path is never both
    /// changed and erroring) and observers are notified for `errors` and
    /// for the path. Storage always precedes notification.
    pub async fn set(&mut self, path: impl Into<Path>, value: impl Into<Value>) -> Validation {
        let path = path.into();
        let value = value.into();

        let outcome = if self.options.skip_validate {
            Validation::Valid
        } else {
            let old = self.get(&path);
            self.validator.validate(&path, &value, old.as_ref()).await
        };

        let key = path.to_string();
        match &outcome {
            Validation::Valid => {
                self.changes.insert(&path, value);
                self.errors.remove(&key);
                trace!(path = %key, "staged change");
                self.notify("changes");
                self.notify(&key);
            }
            Validation::Invalid(messages) => {
                self.changes.remove(&path);
                self.errors
                    .insert(key.clone(), ValidationError::new(value, messages.clone()));
                trace!(path = %key, "validation failed");
                self.notify("errors");
                self.notify(&key);
            }
        }
        outcome
    }

    /// Read the value visible at a dotted path.
    ///
    /// Resolution order, first match wins: the staged-change tree, the
    /// store's own aggregate views (`changes`, `errors`, `is_valid`,
    /// `is_dirty`, with dotted reads into them), then the underlying
    /// content. Reading a staged parent object synthesizes a merged view
    /// so unedited sibling keys from content are not lost; the synthesis
    /// is read-only and never touches content or the buffer.
    pub fn get(&self, path: impl Into<Path>) -> Option<Value> {
        let path = path.into();
        let Some((base, rest)) = path.split_first() else {
            return Some(self.content.snapshot());
        };

        if let Some(node) = self.changes.entry(base) {
            let subtree = node.normalize();
            let candidate = if rest.is_empty() {
                Some(subtree)
            } else {
                object::safe_get(&subtree, &rest)
            };
            if let Some(candidate) = candidate {
                if !object::is_mergeable(&candidate) {
                    return Some(candidate);
                }
                return Some(self.synthesize(&path, candidate));
            }
            // Staged subtree does not cover the path; fall through.
        }

        if let Some(value) = self.virtual_key(base, &rest) {
            return Some(value);
        }

        let content = self.content.snapshot();
        self.accessor.safe_get(&content, &path)
    }

    /// Merge unchanged sibling keys from content into a staged sub-object.
    fn synthesize(&self, path: &Path, candidate: Value) -> Value {
        let content = self.content.snapshot();
        let Some(sub) = self.accessor.safe_get(&content, path) else {
            return candidate;
        };
        let mergeable = object::is_mergeable(&sub)
            && !object::is_to_one_reference(&sub)
            && !self.changes.is_leaf(path);
        let Some(sub_map) = sub.as_object().filter(|_| mergeable) else {
            return candidate;
        };
        let mut out = match candidate {
            Value::Object(map) => map,
            other => return other,
        };

        for (key, content_value) in sub_map {
            if self.changes.is_leaf(&path.child(key)) {
                continue;
            }
            let replacement = match out.get(key) {
                Some(staged) => match (staged.as_object(), content_value.as_object()) {
                    (Some(staged_obj), Some(content_obj)) => {
                        Some(Value::Object(object::shallow_merge(content_obj, staged_obj)))
                    }
                    _ => None,
                },
                None => Some(content_value.clone()),
            };
            if let Some(value) = replacement {
                out.insert(key.clone(), value);
            }
        }
        Value::Object(out)
    }

    /// Resolve the store's own aggregate views, with dotted reads into them.
    fn virtual_key(&self, base: &str, rest: &Path) -> Option<Value> {
        let view = match base {
            "changes" | "change" => self.changes.normalize(),
            "errors" | "error" => self.errors_view(),
            "is_valid" => Value::Bool(self.is_valid()),
            "is_dirty" => Value::Bool(self.is_dirty()),
            _ => return None,
        };
        if rest.is_empty() {
            Some(view)
        } else {
            object::safe_get(&view, rest)
        }
    }

    /// The errors map as a nested tree, so dotted reads resolve into it.
    fn errors_view(&self) -> Value {
        let mut out = Value::Object(Map::new());
        for (key, error) in &self.errors {
            let mut record = Map::new();
            record.insert("value".to_owned(), error.value.clone());
            record.insert(
                "validation".to_owned(),
                Value::Array(error.validation.iter().cloned().map(Value::String).collect()),
            );
            // Only object skeletons are created here, so this cannot fail.
            let _ = object::safe_set(&mut out, &Path::from(key), Value::Object(record));
        }
        out
    }

    /// Record a validation error for a path, overwriting any prior record.
    ///
    /// Any staged change for the path is dropped so the path is never both
    /// changed and erroring. Returns the passed error unchanged.
    pub fn add_error(&mut self, path: impl Into<Path>, error: ValidationError) -> ValidationError {
        let path = path.into();
        let key = path.to_string();
        self.changes.remove(&path);
        self.errors.insert(key.clone(), error.clone());
        self.notify("errors");
        self.notify(&key);
        error
    }

    /// Append failure messages to the error record for a path.
    ///
    /// When no record exists yet, the currently visible value for the path
    /// is captured as the rejected value. Returns the stored record.
    pub fn push_errors<I, S>(&mut self, path: impl Into<Path>, messages: I) -> ValidationError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.into();
        let key = path.to_string();
        let value = match self.errors.get(&key) {
            Some(existing) => existing.value.clone(),
            None => self.get(&path).unwrap_or(Value::Null),
        };
        self.changes.remove(&path);
        let entry = self
            .errors
            .entry(key.clone())
            .or_insert_with(|| ValidationError::new(value, Vec::new()));
        entry.validation.extend(messages.into_iter().map(Into::into));
        let stored = entry.clone();
        self.notify("errors");
        self.notify(&key);
        stored
    }

    /// Remove a key from one of the internal maps.
    ///
    /// An empty key clears the whole map. Notifies for the dotted
    /// `<map>.<key>` combination and for the map name alone.
    pub fn delete_key(&mut self, map: InternalMap, key: &str) {
        match map {
            InternalMap::Changes => {
                if key.is_empty() {
                    self.changes.clear();
                } else {
                    self.changes.remove(&Path::from(key));
                }
            }
            InternalMap::Errors => {
                if key.is_empty() {
                    self.errors.clear();
                } else {
                    self.errors.remove(key);
                }
            }
        }
        let name = map.as_str();
        if !key.is_empty() {
            self.notify(&format!("{name}.{key}"));
        }
        self.notify(name);
    }

    /// Drop the staged change and the error record for a path.
    pub fn delete(&mut self, path: impl Into<Path>) -> &mut Self {
        let key = path.into().to_string();
        self.delete_key(InternalMap::Changes, &key);
        self.delete_key(InternalMap::Errors, &key);
        self
    }

    /// Drop every staged change and error record.
    pub fn rollback(&mut self) -> &mut Self {
        debug!(id = %self.id, "rolling back staged state");
        self.delete_key(InternalMap::Changes, "");
        self.delete_key(InternalMap::Errors, "");
        self
    }

    /// Reconcile the buffer into the content.
    ///
    /// Fires only when the store is valid and dirty: the staged changes are
    /// deep-merged into a copy of the content, the merged value replaces the
    /// content, and the buffer is cleared. Chainable no-op otherwise.
    /// Accessor failures during the merge propagate to the caller.
    pub fn execute(&mut self) -> ChangesetResult<&mut Self> {
        if self.is_valid() && self.is_dirty() {
            let staged = self.changes.normalize();
            let mut next = self.content.snapshot();
            merge_deep(&mut next, &staged, self.accessor.as_ref())?;
            self.content.replace(next);
            self.changes.clear();
            debug!(id = %self.id, "executed staged changes");
            self.notify("content");
            self.notify("changes");
        }
        Ok(self)
    }

    /// View of this store rooted at a base path.
    pub fn scope(&mut self, base: impl Into<Path>) -> crate::Scope<'_> {
        crate::Scope::new(self, base.into())
    }

    #[inline]
    fn notify(&self, key: &str) {
        self.notifier.notify(&self.id, key);
    }
}

impl std::fmt::Debug for Changeset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Changeset")
            .field("id", &self.id)
            .field("changes", &self.changes)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// Store implementations the factory can produce.
///
/// The construction surface is parameterized over this trait so a caller
/// can substitute an alternate buffered-store implementation while keeping
/// the factory call site uniform.
pub trait BufferedStore: Sized {
    /// Build a store from the collected construction arguments.
    fn from_builder(builder: ChangesetBuilder) -> ChangesetResult<Self>;
}

impl BufferedStore for Changeset {
    fn from_builder(builder: ChangesetBuilder) -> ChangesetResult<Self> {
        let parts = builder.into_parts()?;
        Ok(Changeset {
            id: parts.id,
            content: ContentCell::new(parts.content),
            changes: ChangeTree::new(),
            errors: BTreeMap::new(),
            validator: parts.validator,
            notifier: parts.notifier,
            accessor: parts.accessor,
            options: parts.options,
        })
    }
}

/// Collected construction arguments, validated.
pub struct BuilderParts {
    /// The underlying content object.
    pub content: Value,
    /// Identifier reported to the notifier.
    pub id: String,
    /// The per-key validation contract.
    pub validator: Arc<dyn Validator>,
    /// The observer notification hook.
    pub notifier: Arc<dyn Notifier>,
    /// The deep-path accessor pair.
    pub accessor: Arc<dyn Accessor>,
    /// Remaining options.
    pub options: ChangesetOptions,
}

/// Builder for `Changeset` (and alternate `BufferedStore` implementations).
pub struct ChangesetBuilder {
    content: Value,
    id: String,
    validator: Arc<dyn Validator>,
    notifier: Arc<dyn Notifier>,
    accessor: Arc<dyn Accessor>,
    options: ChangesetOptions,
}

impl ChangesetBuilder {
    fn new(content: impl Into<Value>) -> Self {
        Self {
            content: content.into(),
            id: "changeset".to_owned(),
            validator: Arc::new(AlwaysValid),
            notifier: Arc::new(NullNotifier),
            accessor: Arc::new(JsonAccessor),
            options: ChangesetOptions::default(),
        }
    }

    /// Set the identifier reported to the notifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Supply the validation contract.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Supply the notification hook.
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Supply the deep-path accessor pair.
    pub fn accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.accessor = Arc::new(accessor);
        self
    }

    /// Bypass validation for every `set`.
    pub fn skip_validate(mut self, skip: bool) -> Self {
        self.options.skip_validate = skip;
        self
    }

    /// Validate the arguments and hand them out for store construction.
    ///
    /// Content must be a plain object; absent (`null`) or sequence-typed
    /// content is rejected.
    pub fn into_parts(self) -> ChangesetResult<BuilderParts> {
        if !self.content.is_object() {
            return Err(ChangesetError::invalid_content(value_type_name(
                &self.content,
            )));
        }
        Ok(BuilderParts {
            content: self.content,
            id: self.id,
            validator: self.validator,
            notifier: self.notifier,
            accessor: self.accessor,
            options: self.options,
        })
    }

    /// Build the default `Changeset` store.
    pub fn build(self) -> ChangesetResult<Changeset> {
        Changeset::from_builder(self)
    }
}

/// Create a changeset over the given content with default collaborators.
pub fn changeset(content: impl Into<Value>) -> ChangesetResult<Changeset> {
    Changeset::builder(content).build()
}

/// Create a store of an alternate implementation from a builder.
pub fn changeset_with<S: BufferedStore>(builder: ChangesetBuilder) -> ChangesetResult<S> {
    S::from_builder(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_content() {
        assert!(matches!(
            changeset(json!(null)).unwrap_err(),
            ChangesetError::InvalidContent { found: "null" }
        ));
        assert!(matches!(
            changeset(json!([1, 2])).unwrap_err(),
            ChangesetError::InvalidContent { found: "array" }
        ));
        assert!(changeset(json!({})).is_ok());
    }

    #[test]
    fn test_starts_clean_and_valid() {
        let cs = changeset(json!({"a": 1})).unwrap();
        assert!(cs.is_valid());
        assert!(!cs.is_dirty());
        assert_eq!(cs.changes(), json!({}));
        assert!(cs.errors().is_empty());
    }

    #[test]
    fn test_alternate_store_implementation() {
        struct Recording {
            content: Value,
        }

        impl BufferedStore for Recording {
            fn from_builder(builder: ChangesetBuilder) -> ChangesetResult<Self> {
                let parts = builder.into_parts()?;
                Ok(Recording {
                    content: parts.content,
                })
            }
        }

        let store: Recording =
            changeset_with(Changeset::builder(json!({"a": 1}))).unwrap();
        assert_eq!(store.content, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_skip_validate_records_everything() {
        struct RejectAll;

        #[async_trait::async_trait]
        impl Validator for RejectAll {
            async fn validate(&self, _: &Path, _: &Value, _: Option<&Value>) -> Validation {
                Validation::invalid("rejected")
            }
        }

        let mut cs = Changeset::builder(json!({"a": 1}))
            .validator(RejectAll)
            .skip_validate(true)
            .build()
            .unwrap();
        assert!(cs.set("a", json!(2)).await.is_valid());
        assert_eq!(cs.get("a"), Some(json!(2)));
    }
}
