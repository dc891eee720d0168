//! Tests for validation failures, error records, and construction misuse.

use scrim_changeset::{
    changeset, Changeset, ChangesetError, FnValidator, InternalMap, Path, Validation,
    ValidationError, Validator, ValidatorMap, Value,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn reject_negative() -> impl Validator {
    FnValidator(|_: &Path, new: &Value, _: Option<&Value>| {
        Validation::from(new.as_i64().is_none_or(|n| n >= 0))
    })
}

fn guarded() -> Changeset {
    Changeset::builder(json!({"name": "Jim", "age": 10}))
        .validator(reject_negative())
        .build()
        .unwrap()
}

#[tokio::test]
async fn failing_set_records_error_and_leaves_reads_unchanged() {
    let mut cs = guarded();
    let outcome = cs.set("age", json!(-1)).await;

    assert_eq!(outcome, Validation::Invalid(vec!["is invalid".into()]));
    assert_eq!(cs.get("age"), Some(json!(10)));
    assert!(!cs.is_valid());

    let error = cs.error("age").unwrap();
    assert_eq!(error.value, json!(-1));
    assert_eq!(error.validation, ["is invalid"]);
}

#[tokio::test]
async fn passing_set_clears_a_prior_error() {
    let mut cs = guarded();
    cs.set("age", json!(-1)).await;
    assert!(!cs.is_valid());

    cs.set("age", json!(11)).await;

    assert!(cs.is_valid());
    assert!(cs.error("age").is_none());
    assert_eq!(cs.get("age"), Some(json!(11)));
}

#[tokio::test]
async fn failing_set_drops_a_prior_staged_change() {
    let mut cs = guarded();
    cs.set("age", json!(11)).await;
    cs.set("age", json!(-1)).await;

    // A path is never both changed and erroring.
    assert_eq!(cs.changes(), json!({}));
    assert!(cs.error("age").is_some());
    assert_eq!(cs.get("age"), Some(json!(10)));
}

#[tokio::test]
async fn later_failures_overwrite_earlier_records() {
    let mut cs = guarded();
    cs.set("age", json!(-1)).await;
    cs.set("age", json!(-2)).await;
    assert_eq!(cs.error("age").unwrap().value, json!(-2));
    assert_eq!(cs.errors().len(), 1);
}

#[tokio::test]
async fn validator_sees_path_new_and_old_values() {
    let seen: Arc<Mutex<Vec<(String, Value, Option<Value>)>>> = Arc::new(Mutex::new(Vec::new()));
    let record = {
        let seen = seen.clone();
        FnValidator(move |path: &Path, new: &Value, old: Option<&Value>| {
            seen.lock()
                .unwrap()
                .push((path.to_string(), new.clone(), old.cloned()));
            Validation::Valid
        })
    };
    let mut cs = Changeset::builder(json!({"age": 10}))
        .validator(record)
        .build()
        .unwrap();

    cs.set("age", json!(11)).await;
    cs.set("age", json!(12)).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], ("age".into(), json!(11), Some(json!(10))));
    // The second call sees the staged value as the old one.
    assert_eq!(seen[1], ("age".into(), json!(12), Some(json!(11))));
}

#[tokio::test]
async fn async_validator_outcome_applies_after_resolution() {
    struct SlowNonEmpty;

    #[async_trait::async_trait]
    impl Validator for SlowNonEmpty {
        async fn validate(&self, _: &Path, new: &Value, _: Option<&Value>) -> Validation {
            tokio::task::yield_now().await;
            match new.as_str() {
                Some(s) if !s.is_empty() => Validation::Valid,
                _ => Validation::invalid("must be a non-empty string"),
            }
        }
    }

    let mut cs = Changeset::builder(json!({"name": "Jim"}))
        .validator(SlowNonEmpty)
        .build()
        .unwrap();

    assert!(cs.set("name", json!("Bob")).await.is_valid());
    assert_eq!(cs.get("name"), Some(json!("Bob")));

    let outcome = cs.set("name", json!("")).await;
    assert_eq!(outcome.messages(), ["must be a non-empty string"]);
    assert_eq!(cs.get("name"), Some(json!("Jim")));
}

#[tokio::test]
async fn validator_map_dispatches_per_path() {
    let validators = ValidatorMap::new().with("age", reject_negative());
    let mut cs = Changeset::builder(json!({"name": "Jim", "age": 10}))
        .validator(validators)
        .build()
        .unwrap();

    assert!(!cs.set("age", json!(-1)).await.is_valid());
    // Paths without a registered validator pass.
    assert!(cs.set("name", json!("")).await.is_valid());
}

#[tokio::test]
async fn add_error_returns_the_passed_record() {
    let mut cs = changeset(json!({"email": "a@x.com"})).unwrap();
    cs.set("email", json!("b@x.com")).await;

    let error = ValidationError::new(json!("b@x.com"), vec!["already taken".into()]);
    let returned = cs.add_error("email", error.clone());

    assert_eq!(returned, error);
    assert_eq!(cs.error("email"), Some(&error));
    assert!(!cs.is_valid());
    // The staged change is dropped to keep the maps mutually exclusive.
    assert_eq!(cs.changes(), json!({}));
}

#[tokio::test]
async fn push_errors_captures_the_buffered_value() {
    let mut cs = changeset(json!({"age": 10})).unwrap();
    cs.set("age", json!(11)).await;

    let stored = cs.push_errors("age", ["rejected upstream"]);
    assert_eq!(stored.value, json!(11));
    assert_eq!(stored.validation, ["rejected upstream"]);

    let stored = cs.push_errors("age", ["try again later"]);
    assert_eq!(stored.validation, ["rejected upstream", "try again later"]);
    assert_eq!(cs.error("age").unwrap().validation.len(), 2);
}

#[tokio::test]
async fn delete_drops_change_and_error() {
    let mut cs = guarded();
    cs.set("name", json!("Bob")).await;
    cs.set("age", json!(-1)).await;

    cs.delete("name").delete("age");

    assert!(!cs.is_dirty());
    assert!(cs.is_valid());
    assert_eq!(cs.get("name"), Some(json!("Jim")));
}

#[tokio::test]
async fn delete_key_with_empty_key_clears_the_map() {
    let mut cs = guarded();
    cs.set("name", json!("Bob")).await;
    cs.set("age", json!(-1)).await;

    cs.delete_key(InternalMap::Changes, "");
    assert!(!cs.is_dirty());
    assert!(!cs.is_valid());

    cs.delete_key(InternalMap::Errors, "");
    assert!(cs.is_valid());
}

#[tokio::test]
async fn rollback_resets_the_buffer() {
    let mut cs = guarded();
    cs.set("name", json!("Bob")).await;
    cs.set("age", json!(-1)).await;

    cs.rollback();

    assert!(!cs.is_dirty());
    assert!(cs.is_valid());
    assert_eq!(cs.get("name"), Some(json!("Jim")));
    assert_eq!(cs.content().snapshot(), json!({"name": "Jim", "age": 10}));
}

#[test]
fn construction_rejects_missing_or_sequence_content() {
    assert!(matches!(
        changeset(Value::Null).unwrap_err(),
        ChangesetError::InvalidContent { found: "null" }
    ));
    assert!(matches!(
        changeset(json!(["a", "b"])).unwrap_err(),
        ChangesetError::InvalidContent { found: "array" }
    ));
    assert!(matches!(
        changeset(json!("text")).unwrap_err(),
        ChangesetError::InvalidContent { found: "string" }
    ));
}
