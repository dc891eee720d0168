//! Transparent accessor facade rooted at a base path.
//!
//! A `Scope` forwards reads and writes to the store's `get`/`set` with its
//! base path joined in, so external code can treat a nested sub-object as
//! if it were the store itself. It stays a thin adapter outside the core.

use crate::store::Changeset;
use crate::validate::Validation;
use crate::Path;
use serde_json::Value;

/// A view of a changeset rooted at a base path.
///
/// # Examples
///
/// ```
/// use scrim_changeset::changeset;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> scrim_changeset::ChangesetResult<()> {
/// let mut cs = changeset(json!({"user": {"name": "A", "email": "a@x.com"}}))?;
/// let mut user = cs.scope("user");
/// user.set("name", json!("B")).await;
/// assert_eq!(user.get("name"), Some(json!("B")));
/// assert_eq!(user.get("email"), Some(json!("a@x.com")));
/// # Ok(())
/// # }
/// ```
pub struct Scope<'a> {
    store: &'a mut Changeset,
    base: Path,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(store: &'a mut Changeset, base: Path) -> Self {
        Self { store, base }
    }

    /// The base path of this scope.
    #[inline]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Read a value relative to the base path.
    ///
    /// The empty path reads the base itself.
    pub fn get(&self, path: impl Into<Path>) -> Option<Value> {
        self.store.get(self.base.join(&path.into()))
    }

    /// Stage a value relative to the base path.
    pub async fn set(&mut self, path: impl Into<Path>, value: impl Into<Value>) -> Validation {
        self.store.set(self.base.join(&path.into()), value).await
    }

    /// Narrow this scope to a deeper base path.
    pub fn scope(&mut self, path: impl Into<Path>) -> Scope<'_> {
        let base = self.base.join(&path.into());
        Scope {
            store: &mut *self.store,
            base,
        }
    }
}
