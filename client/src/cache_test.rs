use uuid::Uuid;

use super::*;

fn card() -> CardId {
    Uuid::parse_str("0b8f7c3e-2f64-4f6e-9a14-6d2f9c1a5e77").unwrap()
}

#[test]
fn minted_keys_are_card_scoped_and_unique() {
    let a = ImageCache::mint_key(card());
    let b = ImageCache::mint_key(card());
    assert!(a.starts_with(&format!("img-{}-", card())));
    assert_ne!(a, b);
}

#[test]
fn store_and_resolve_roundtrip() {
    let cache = ImageCache::in_memory();
    let key = cache.store_upload(card(), "data:image/png;base64,AAAA");
    assert_eq!(cache.resolve(&key).as_deref(), Some("data:image/png;base64,AAAA"));
}

#[test]
fn unknown_key_resolves_to_none() {
    let cache = ImageCache::in_memory();
    assert!(cache.resolve("img-missing").is_none());
}

#[test]
fn put_replaces_existing_value() {
    let store = MemoryStore::new();
    store.put("k", "first");
    store.put("k", "second");
    assert_eq!(store.get("k").as_deref(), Some("second"));
}
