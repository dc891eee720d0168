//! Tests for the transparent accessor facade.

use scrim_changeset::{changeset, Changeset, FnValidator, Path, Validation, Value};
use serde_json::json;

#[tokio::test]
async fn scope_forwards_reads_and_writes() {
    let mut cs = changeset(json!({"user": {"name": "A", "email": "a@x.com"}})).unwrap();
    let mut user = cs.scope("user");

    assert!(user.set("name", json!("B")).await.is_valid());
    assert_eq!(user.get("name"), Some(json!("B")));
    // Sibling merge works through the facade too.
    assert_eq!(
        user.get(Path::root()),
        Some(json!({"name": "B", "email": "a@x.com"}))
    );

    drop(user);
    assert_eq!(cs.get("user.name"), Some(json!("B")));
}

#[tokio::test]
async fn scoped_writes_validate_against_the_full_path() {
    let require_city = FnValidator(|path: &Path, new: &Value, _: Option<&Value>| {
        if path.to_string() == "address.city" && new.as_str().is_none_or(str::is_empty) {
            Validation::invalid("city required")
        } else {
            Validation::Valid
        }
    });
    let mut cs = Changeset::builder(json!({"address": {"city": "Aberdeen"}}))
        .validator(require_city)
        .build()
        .unwrap();

    let mut address = cs.scope("address");
    assert!(!address.set("city", json!("")).await.is_valid());
    assert!(address.set("city", json!("Portland")).await.is_valid());

    drop(address);
    assert_eq!(cs.error("address.city"), None);
    assert_eq!(cs.get("address.city"), Some(json!("Portland")));
}

#[tokio::test]
async fn scopes_nest() {
    let mut cs = changeset(json!({"user": {"profile": {"bio": "hi"}}})).unwrap();
    let mut user = cs.scope("user");
    let mut profile = user.scope("profile");

    assert_eq!(profile.base().to_string(), "user.profile");
    profile.set("bio", json!("hello")).await;

    drop(profile);
    drop(user);
    cs.execute().unwrap();
    assert_eq!(
        cs.content().snapshot(),
        json!({"user": {"profile": {"bio": "hello"}}})
    );
}
