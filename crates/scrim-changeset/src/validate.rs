//! The externally supplied validation contract.
//!
//! Validators run per key on every `set` and may be synchronous or
//! asynchronous; the async trait subsumes both. The store never treats a
//! validation failure as an error: outcomes are recorded in the errors map.

use crate::Path;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of validating a single key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    /// The value passed validation.
    Valid,
    /// The value failed validation, with one message per failed rule.
    Invalid(Vec<String>),
}

impl Validation {
    /// Create a failing outcome with a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Validation::Invalid(vec![message.into()])
    }

    /// Returns true for a passing outcome.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// The failure messages, empty for a passing outcome.
    pub fn messages(&self) -> &[String] {
        match self {
            Validation::Valid => &[],
            Validation::Invalid(messages) => messages,
        }
    }
}

impl From<bool> for Validation {
    fn from(passed: bool) -> Self {
        if passed {
            Validation::Valid
        } else {
            Validation::invalid("is invalid")
        }
    }
}

/// A recorded validation failure for one path.
///
/// `value` is the rejected value as it was passed to `set`; `validation`
/// holds the failure messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The value that failed validation.
    pub value: Value,
    /// The validation failure messages.
    pub validation: Vec<String>,
}

impl ValidationError {
    /// Create an error record from a rejected value and its messages.
    pub fn new(value: impl Into<Value>, validation: Vec<String>) -> Self {
        Self {
            value: value.into(),
            validation,
        }
    }
}

/// Per-key validation contract supplied at construction.
///
/// Receives the path being set, the incoming value, and the value currently
/// visible at that path (staged change or underlying content), and returns
/// the outcome. The default validator passes everything.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate `new_value` for `path`.
    async fn validate(
        &self,
        path: &Path,
        new_value: &Value,
        old_value: Option<&Value>,
    ) -> Validation;
}

/// Validator that passes every value.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysValid;

#[async_trait]
impl Validator for AlwaysValid {
    async fn validate(&self, _path: &Path, _new: &Value, _old: Option<&Value>) -> Validation {
        Validation::Valid
    }
}

/// Adapter turning a plain closure into a `Validator`.
///
/// # Examples
///
/// ```
/// use scrim_changeset::{FnValidator, Validation};
///
/// let non_empty = FnValidator(|_path: &scrim_changeset::Path, new: &serde_json::Value, _old: Option<&serde_json::Value>| {
///     match new.as_str() {
///         Some(s) if s.is_empty() => Validation::invalid("must not be empty"),
///         _ => Validation::Valid,
///     }
/// });
/// # let _ = non_empty;
/// ```
pub struct FnValidator<F>(pub F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&Path, &Value, Option<&Value>) -> Validation + Send + Sync,
{
    async fn validate(&self, path: &Path, new: &Value, old: Option<&Value>) -> Validation {
        (self.0)(path, new, old)
    }
}

/// Dispatches to a per-path validator; paths with no entry pass.
#[derive(Default)]
pub struct ValidatorMap {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for a path (builder pattern).
    pub fn with(mut self, path: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.insert(path, validator);
        self
    }

    /// Register a validator for a path.
    pub fn insert(&mut self, path: impl Into<String>, validator: impl Validator + 'static) {
        self.validators.insert(path.into(), Arc::new(validator));
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

#[async_trait]
impl Validator for ValidatorMap {
    async fn validate(&self, path: &Path, new: &Value, old: Option<&Value>) -> Validation {
        match self.validators.get(&path.to_string()) {
            Some(validator) => validator.validate(path, new, old).await,
            None => Validation::Valid,
        }
    }
}
