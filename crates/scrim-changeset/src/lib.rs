//! Buffered property edits staged in front of plain JSON content.
//!
//! `scrim-changeset` puts a staging buffer between a caller (a form-editing
//! flow, typically) and the object being edited. Writes of dotted property
//! paths are validated and recorded in the buffer, reads resolve across the
//! buffer and the underlying content, and the content itself is only
//! mutated when the buffer is explicitly committed.
//!
//! # Core Concepts
//!
//! - **Changeset**: the buffered store holding staged changes, validation
//!   errors, and a handle to the content, resolved in that order on reads
//! - **Change / ChangeTree**: the tagged wrapper and nested tree that keep
//!   staged edits apart from plain values
//! - **Validator**: externally supplied per-key validation, sync or async
//! - **Notifier**: observer hook informed after every mutation
//! - **Accessor**: pluggable deep-path read/write over the content
//! - **Scope**: thin facade forwarding reads/writes under a base path
//!
//! # Staged Until Executed
//!
//! ```text
//! set(path, value) ─► validate ─► buffer        (content untouched)
//! get(path)        ─► changes → views → content
//! execute()        ─► content = merge(content, changes), buffer cleared
//! ```
//!
//! # Quick Start
//!
//! ```
//! use scrim_changeset::{changeset, Validation};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> scrim_changeset::ChangesetResult<()> {
//! let mut cs = changeset(json!({"name": "Jim", "age": 10}))?;
//! let content = cs.content();
//!
//! let outcome = cs.set("age", json!(11)).await;
//! assert_eq!(outcome, Validation::Valid);
//!
//! // The buffer answers reads; the content is untouched.
//! assert_eq!(cs.get("age"), Some(json!(11)));
//! assert_eq!(content.snapshot()["age"], json!(10));
//!
//! cs.execute()?;
//! assert_eq!(content.snapshot()["age"], json!(11));
//! # Ok(())
//! # }
//! ```
//!
//! # Nested Edits Keep Their Siblings
//!
//! Editing one nested field must not make a read of the parent lose the
//! unedited sibling fields that live only in content:
//!
//! ```
//! use scrim_changeset::changeset;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> scrim_changeset::ChangesetResult<()> {
//! let mut cs = changeset(json!({"user": {"name": "A", "email": "a@x.com"}}))?;
//! cs.set("user.name", json!("B")).await;
//!
//! assert_eq!(
//!     cs.get("user"),
//!     Some(json!({"name": "B", "email": "a@x.com"})),
//! );
//! # Ok(())
//! # }
//! ```

mod change;
mod content;
mod error;
mod merge;
mod notify;
mod object;
mod path;
mod scope;
mod store;
mod validate;

// Core types
pub use change::{Change, ChangeTree};
pub use content::ContentCell;
pub use error::{value_type_name, ChangesetError, ChangesetResult};
pub use merge::merge_deep;
pub use path::Path;
pub use scope::Scope;
pub use store::{
    changeset, changeset_with, BufferedStore, BuilderParts, Changeset, ChangesetBuilder,
    ChangesetOptions, InternalMap,
};

// Collaborator contracts
pub use notify::{Notifier, NullNotifier, RecordingNotifier};
pub use object::{
    is_mergeable, is_to_one_reference, safe_get, safe_set, shallow_merge, Accessor, JsonAccessor,
};
pub use validate::{AlwaysValid, FnValidator, Validation, ValidationError, Validator, ValidatorMap};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
