//! Persisted single-slot draft stores.

use crate::checkout::{DeliveryDraft, OrderDraft};
use crate::error::CommerceError;
use aims_cache::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Storage key for the order draft.
pub const ORDER_KEY: &str = "order";
/// Storage key for the delivery draft.
pub const DELIVERY_KEY: &str = "delivery";

/// Holds at most one `T` under a fixed cache key.
///
/// `save` overwrites; `load` treats anything unreadable as nothing stored.
pub struct DraftStore<T> {
    cache: Cache,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

pub type OrderDraftStore = DraftStore<OrderDraft>;
pub type DeliveryDraftStore = DraftStore<DeliveryDraft>;

impl<T: Serialize + DeserializeOwned> DraftStore<T> {
    /// A store for the single draft kept under `key`.
    pub fn new(cache: Cache, key: &'static str) -> Self {
        Self {
            cache,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Replace the stored draft.
    pub fn save(&self, draft: &T) -> Result<(), CommerceError> {
        self.cache.set(self.key, draft)?;
        tracing::debug!(key = self.key, "draft saved");
        Ok(())
    }

    /// The stored draft, or `None` if absent or unreadable.
    pub fn load(&self) -> Option<T> {
        self.cache.get_or_discard(self.key)
    }

    /// Drop the stored draft. Missing drafts are not an error.
    pub fn clear(&self) -> Result<(), CommerceError> {
        self.cache.delete(self.key)?;
        Ok(())
    }
}

impl OrderDraftStore {
    /// The order draft slot.
    pub fn orders(cache: Cache) -> Self {
        Self::new(cache, ORDER_KEY)
    }
}

impl DeliveryDraftStore {
    /// The delivery draft slot.
    pub fn deliveries(cache: Cache) -> Self {
        Self::new(cache, DELIVERY_KEY)
    }
}

impl<T> Clone for DraftStore<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DraftStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::DeliveryId;
    use crate::money::Money;

    #[test]
    fn test_load_absent() {
        let store = OrderDraftStore::orders(Cache::in_memory());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let store = DeliveryDraftStore::deliveries(Cache::in_memory());
        let mut draft = DeliveryDraft {
            name: "A".into(),
            delivery_fee: Money::vnd(22_000),
            ..Default::default()
        };
        store.save(&draft).unwrap();
        draft.delivery_id = DeliveryId::new(5);
        store.save(&draft).unwrap();

        assert_eq!(store.load(), Some(draft));
    }

    #[test]
    fn test_unparseable_is_absent() {
        let cache = Cache::in_memory();
        cache.set(ORDER_KEY, &"not an order").unwrap();
        let store = OrderDraftStore::orders(cache.clone());
        assert!(store.load().is_none());

        cache.set_raw(DELIVERY_KEY, b"{").unwrap();
        assert!(DeliveryDraftStore::deliveries(cache).load().is_none());
    }

    #[test]
    fn test_clear() {
        let store = OrderDraftStore::orders(Cache::in_memory());
        store.save(&OrderDraft::default()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_stores_share_cache_without_clobbering() {
        let cache = Cache::in_memory();
        let orders = OrderDraftStore::orders(cache.clone());
        let deliveries = DeliveryDraftStore::deliveries(cache);
        orders.save(&OrderDraft::default()).unwrap();
        deliveries.save(&DeliveryDraft::default()).unwrap();
        assert!(orders.load().is_some());
        assert!(deliveries.load().is_some());
    }
}
