//! Cache contract behaviour on top of a minimal in-memory backend.

mod common;

use std::time::Duration;

use bytes::Bytes;
use cellar_backend::{
    Backend, BackendError, CacheBackend, DeleteStatus, EntryCodec, Namespace, ValueFormat,
};
use common::TestBackend;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u64,
    name: String,
    tags: Vec<String>,
}

#[tokio::test]
async fn set_then_get_roundtrips() {
    let backend = TestBackend::new("app");
    backend.set("answer", &42i64, None).await.unwrap();
    assert_eq!(backend.get::<i64>("answer").await.unwrap(), 42);
}

#[tokio::test]
async fn nested_value_keeps_its_shape() {
    let backend = TestBackend::new("app");
    let value = json!({"a": 1, "b": [1, 2, 3]});
    backend.set("x", &value, None).await.unwrap();
    let cached: Value = backend.get("x").await.unwrap();
    assert_eq!(cached, value);
}

#[tokio::test]
async fn typed_records_roundtrip_with_bincode() {
    let backend = TestBackend::new("app").with_format(ValueFormat::Bincode);
    let profile = Profile {
        id: 1,
        name: "ada".into(),
        tags: vec!["admin".into(), "ops".into()],
    };
    backend.set("profile:1", &profile, None).await.unwrap();
    assert_eq!(backend.get::<Profile>("profile:1").await.unwrap(), profile);
}

#[tokio::test]
async fn keys_are_stored_under_namespace() {
    let backend = TestBackend::new("app");
    backend.set("user:1", "ada", None).await.unwrap();
    assert!(backend.raw("app:user:1").is_some());
    assert!(backend.raw("user:1").is_none());
}

#[tokio::test]
async fn missing_key_is_not_found() {
    let backend = TestBackend::new("app");
    let err = backend.get::<String>("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!backend.has("nope").await.unwrap());
}

#[tokio::test]
async fn forget_removes_entry() {
    let backend = TestBackend::new("app");
    backend.set("k", &1, None).await.unwrap();
    assert!(backend.has("k").await.unwrap());
    assert_eq!(backend.forget("k").await.unwrap(), DeleteStatus::Deleted(1));
    assert!(!backend.has("k").await.unwrap());
}

#[tokio::test]
async fn forget_missing_key_is_not_an_error() {
    let backend = TestBackend::new("app");
    assert_eq!(backend.forget("k").await.unwrap(), DeleteStatus::Missing);
}

#[tokio::test]
async fn set_overwrites() {
    let backend = TestBackend::new("app");
    backend.set("k", "first", None).await.unwrap();
    backend.set("k", "second", None).await.unwrap();
    assert_eq!(backend.get::<String>("k").await.unwrap(), "second");
}

#[tokio::test]
async fn ttl_expires_entry() {
    let backend = TestBackend::new("app");
    backend
        .set("short", "lived", Some(Duration::from_secs(1)))
        .await
        .unwrap();
    assert!(backend.has("short").await.unwrap());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(!backend.has("short").await.unwrap());
    assert!(backend.get::<String>("short").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn zero_ttl_stores_nothing() {
    let backend = TestBackend::new("app");
    backend.set("k", &1, None).await.unwrap();
    backend.set("k", &2, Some(Duration::ZERO)).await.unwrap();
    assert!(!backend.has("k").await.unwrap());
}

#[tokio::test]
async fn empty_by_match_removes_only_matching_prefix() {
    let backend = TestBackend::new("app");
    backend.set("user:1", &1, None).await.unwrap();
    backend.set("user:2", &2, None).await.unwrap();
    backend.set("order:1", &3, None).await.unwrap();

    assert_eq!(backend.empty_by_match("user:").await.unwrap(), 2);

    assert!(!backend.has("user:1").await.unwrap());
    assert!(!backend.has("user:2").await.unwrap());
    assert_eq!(backend.get::<i32>("order:1").await.unwrap(), 3);
}

#[tokio::test]
async fn empty_equals_empty_by_match_with_empty_pattern() {
    let first = TestBackend::new("app");
    let second = TestBackend::new("app");
    for backend in [&first, &second] {
        backend.set("a", &1, None).await.unwrap();
        backend.set("b:c", &2, None).await.unwrap();
    }

    assert_eq!(first.empty().await.unwrap(), 2);
    assert_eq!(second.empty_by_match("").await.unwrap(), 2);
    assert_eq!(first.len(), second.len());
    assert_eq!(first.len(), 0);
}

#[tokio::test]
async fn empty_leaves_other_namespaces_alone() {
    let app1 = TestBackend::new("app1");
    let app2 = app1.sharing("app2");
    app1.set("k", &1, None).await.unwrap();
    app2.set("k", &2, None).await.unwrap();

    app1.empty().await.unwrap();

    assert!(!app1.has("k").await.unwrap());
    assert_eq!(app2.get::<i32>("k").await.unwrap(), 2);
}

#[tokio::test]
async fn namespace_prefix_of_another_namespace_is_not_evicted() {
    let app = TestBackend::new("app");
    let app2 = app.sharing("app2");
    app.set("k", &1, None).await.unwrap();
    app2.set("k", &2, None).await.unwrap();

    app.empty().await.unwrap();

    assert!(app2.has("k").await.unwrap());
}

#[tokio::test]
async fn empty_by_match_crosses_batch_boundaries() {
    let backend = TestBackend::new("app").with_batch_size(100);
    for i in 0..2_501 {
        backend.set(&format!("item:{i}"), &i, None).await.unwrap();
    }
    backend.set("keep", &true, None).await.unwrap();

    assert_eq!(backend.empty_by_match("item:").await.unwrap(), 2_501);

    assert_eq!(backend.flushes(), 26);
    assert_eq!(backend.len(), 1);
    assert!(backend.get::<bool>("keep").await.unwrap());
}

#[tokio::test]
async fn empty_by_match_is_idempotent() {
    let backend = TestBackend::new("app");
    for i in 0..10 {
        backend.set(&format!("p:{i}"), &i, None).await.unwrap();
    }
    backend.set("q", &0, None).await.unwrap();

    assert_eq!(backend.empty_by_match("p:").await.unwrap(), 10);
    let after_first = backend.len();
    assert_eq!(backend.empty_by_match("p:").await.unwrap(), 0);
    assert_eq!(backend.len(), after_first);
}

#[tokio::test]
async fn pattern_matching_nothing_removes_nothing() {
    let backend = TestBackend::new("app");
    backend.set("a", &1, None).await.unwrap();
    assert_eq!(backend.empty_by_match("zzz").await.unwrap(), 0);
    assert!(backend.has("a").await.unwrap());
}

#[tokio::test]
async fn corrupted_payload_is_decode_error() {
    let backend = TestBackend::new("app");
    backend.insert_raw("app:bad", Bytes::from_static(b"\x01\x00"));
    let err = backend.get::<String>("bad").await.unwrap_err();
    assert!(matches!(err, BackendError::DecodeError(_)));
}

#[tokio::test]
async fn payload_for_other_key_is_decode_error() {
    let backend = TestBackend::new("app");
    let ns = Namespace::new("app");
    let payload = EntryCodec::default()
        .encode(&ns.key("a"), &1, None)
        .unwrap();
    backend.insert_raw("app:b", payload);
    let err = backend.get::<i32>("b").await.unwrap_err();
    assert!(matches!(err, BackendError::DecodeError(_)));
}

#[tokio::test]
async fn wrong_type_is_decode_error() {
    let backend = TestBackend::new("app");
    backend.set("k", "text", None).await.unwrap();
    let err = backend.get::<u64>("k").await.unwrap_err();
    assert!(matches!(err, BackendError::DecodeError(_)));
}

#[tokio::test]
async fn unencodable_value_is_encode_error() {
    let backend = TestBackend::new("app");
    let mut value = std::collections::HashMap::new();
    value.insert(vec![1u8], 1);
    let err = backend.set("k", &value, None).await.unwrap_err();
    assert!(matches!(err, BackendError::EncodeError(_)));
    assert!(!backend.has("k").await.unwrap());
}

#[tokio::test]
async fn trait_object_exposes_contract() {
    let backend: Box<dyn Backend> = Box::new(TestBackend::new("app"));
    backend.set("k", "v", None).await.unwrap();
    assert_eq!(backend.get::<String>("k").await.unwrap(), "v");
    assert_eq!(backend.empty().await.unwrap(), 1);
}

#[tokio::test]
async fn closed_backend_rejects_operations() {
    let backend = TestBackend::new("app");
    backend.close().await.unwrap();
    backend.close().await.unwrap();
    let err = backend.set("k", &1, None).await.unwrap_err();
    assert!(matches!(err, BackendError::Closed));
}

#[tokio::test]
async fn non_finite_float_is_refused_by_json() {
    let backend = TestBackend::new("app");
    let err = backend.set("f", &f64::NAN, None).await.unwrap_err();
    assert!(matches!(err, BackendError::EncodeError(_)));
    assert!(!backend.has("f").await.unwrap());

    let backend = backend.with_format(ValueFormat::Bincode);
    backend.set("f", &f64::NAN, None).await.unwrap();
    backend.set("inf", &f64::NEG_INFINITY, None).await.unwrap();
    assert!(backend.get::<f64>("f").await.unwrap().is_nan());
    assert_eq!(backend.get::<f64>("inf").await.unwrap(), f64::NEG_INFINITY);
}
