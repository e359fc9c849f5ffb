//! Session store semantics on the in-memory backend.

#![allow(missing_docs)]

use anyhow::Result;
use omni_resume::{DEFAULT_SESSION_TTL_SECS, SessionItem, SessionStore, SessionStoreConfig};

fn conversation() -> Vec<SessionItem> {
    vec![
        SessionItem::user("hello"),
        SessionItem::assistant_message("hi there", "msg_1"),
        SessionItem::user("bye"),
        SessionItem::assistant_text("goodbye"),
    ]
}

#[tokio::test]
async fn items_round_trip_in_insertion_order() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("s1", conversation()[..2].to_vec()).await?;
    store.add_items("s1", conversation()[2..].to_vec()).await?;

    assert_eq!(store.get_items("s1", None).await?, conversation());
    assert_eq!(store.get_items("s1", Some(2)).await?, conversation()[2..].to_vec());
    assert_eq!(store.get_items("s1", Some(10)).await?, conversation());
    assert!(store.get_items("s1", Some(0)).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_append_and_unknown_session_are_no_ops() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("s1", Vec::new()).await?;

    assert!(store.get_items("s1", None).await?.is_empty());
    assert!(!store.exists("s1").await?);
    let info = store.get_session_info("s1").await?;
    assert_eq!(info.item_count, 0);
    assert_eq!(info.ttl_seconds, None);
    assert!(!info.exists);
    assert_eq!(store.pop_item("s1").await?, None);
    Ok(())
}

#[tokio::test]
async fn pop_returns_most_recent_item_until_empty() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store
        .add_items("s1", vec![SessionItem::user("a"), SessionItem::user("b")])
        .await?;

    assert_eq!(store.pop_item("s1").await?, Some(SessionItem::user("b")));
    assert_eq!(store.pop_item("s1").await?, Some(SessionItem::user("a")));
    assert_eq!(store.pop_item("s1").await?, None);
    assert!(!store.exists("s1").await?);
    Ok(())
}

#[tokio::test]
async fn ttl_is_bounded_by_default_and_refreshed_on_extend() -> Result<()> {
    let store = SessionStore::in_memory(600);
    assert!(!store.extend_ttl("s1", Some(30)).await?);

    store.add_items("s1", conversation()).await?;
    let ttl = store.get_session_info("s1").await?.ttl_seconds;
    assert!(ttl.is_some_and(|ttl| ttl > 0 && ttl <= 600), "ttl={ttl:?}");

    assert!(store.extend_ttl("s1", Some(30)).await?);
    let ttl = store.get_session_info("s1").await?.ttl_seconds;
    assert!(ttl.is_some_and(|ttl| ttl > 0 && ttl <= 30), "ttl={ttl:?}");

    assert!(store.extend_ttl("s1", None).await?);
    let ttl = store.get_session_info("s1").await?.ttl_seconds;
    assert!(ttl.is_some_and(|ttl| ttl > 30 && ttl <= 600), "ttl={ttl:?}");
    Ok(())
}

#[tokio::test]
async fn append_resets_shortened_ttl_to_default() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("s1", conversation()).await?;
    assert!(store.extend_ttl("s1", Some(30)).await?);

    store.add_items("s1", vec![SessionItem::user("again")]).await?;
    let ttl = store.get_session_info("s1").await?.ttl_seconds;
    assert!(ttl.is_some_and(|ttl| ttl > 30 && ttl <= 600), "ttl={ttl:?}");
    Ok(())
}

#[tokio::test]
async fn huge_ttls_do_not_overflow_the_deadline() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("s1", conversation()).await?;
    assert!(store.extend_ttl("s1", Some(u64::MAX)).await?);
    assert_eq!(store.get_items("s1", None).await?, conversation());

    let unbounded = SessionStore::in_memory(u64::MAX);
    unbounded.add_items("s2", vec![SessionItem::user("kept")]).await?;
    let info = unbounded.get_session_info("s2").await?;
    assert_eq!(info.item_count, 1);
    assert!(info.ttl_seconds.is_some_and(|ttl| ttl > 0), "ttl={:?}", info.ttl_seconds);
    Ok(())
}

#[tokio::test]
async fn clear_and_prepare_session() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("s1", conversation()).await?;
    store.add_items("s2", conversation()).await?;

    let kept = store.prepare_session("s1", true).await?;
    assert_eq!(kept.item_count, 4);
    assert!(kept.exists);

    let fresh = store.prepare_session("s1", false).await?;
    assert_eq!(fresh.item_count, 0);
    assert!(!store.exists("s1").await?);

    store.clear_session("s2").await?;
    assert!(store.get_items("s2", None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn sessions_are_isolated() -> Result<()> {
    let store = SessionStore::in_memory(600);
    store.add_items("a", vec![SessionItem::user("for a")]).await?;
    store.add_items("b", vec![SessionItem::user("for b")]).await?;
    assert_eq!(store.get_items("a", None).await?, vec![SessionItem::user("for a")]);
    assert_eq!(store.get_items("b", None).await?, vec![SessionItem::user("for b")]);
    Ok(())
}

#[test]
fn missing_url_selects_memory_backend_with_default_ttl() -> Result<()> {
    let store = SessionStore::new(SessionStoreConfig {
        url: Some("   ".to_string()),
        ..SessionStoreConfig::default()
    })?;
    assert_eq!(store.backend_name(), "memory");
    assert_eq!(store.default_ttl_secs(), DEFAULT_SESSION_TTL_SECS);
    Ok(())
}

#[test]
fn invalid_url_is_rejected_at_construction() {
    let result = SessionStore::new(SessionStoreConfig {
        url: Some("not a url".to_string()),
        ..SessionStoreConfig::default()
    });
    assert!(result.is_err());
}
