//! Persisted, shareable cart handle.

use crate::cart::{Cart, CartCommand, CartLine};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use aims_cache::Cache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Storage key for the cart's line list.
pub const CART_KEY: &str = "aims-cart";

/// The shopper's cart, persisted after every change.
///
/// Cloning the handle shares the cart. Every mutation writes the full line
/// list to the cache under [`CART_KEY`] while the cart lock is held, so the
/// stored copy always reflects the latest in-memory state.
#[derive(Debug, Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cart: Mutex<Cart>,
    cache: Cache,
    /// Tokio's mutex hands out the lock in FIFO order.
    queue: tokio::sync::Mutex<()>,
    pending: AtomicUsize,
    latency: Duration,
}

impl CartStore {
    /// Open the cart persisted in `cache`.
    ///
    /// A missing or unreadable entry yields an empty cart.
    pub fn open(cache: Cache, latency: Duration) -> Self {
        let mut cart = Cart::new();
        if let Some(lines) = cache.get_or_discard::<Vec<CartLine>>(CART_KEY) {
            cart.apply(CartCommand::Load { lines });
            tracing::debug!(lines = cart.lines().len(), "restored cart");
        }
        Self {
            inner: Arc::new(Inner {
                cart: Mutex::new(cart),
                cache,
                queue: tokio::sync::Mutex::new(()),
                pending: AtomicUsize::new(0),
                latency,
            }),
        }
    }

    /// An empty, unpersisted cart with no simulated latency.
    pub fn in_memory() -> Self {
        Self::open(Cache::in_memory(), Duration::ZERO)
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a command immediately and persist the result.
    ///
    /// Returns whether the cart changed. The in-memory cart keeps the change
    /// even if the write fails.
    pub fn dispatch(&self, command: CartCommand) -> Result<bool, CommerceError> {
        let name = command.name();
        let mut cart = self.lock();
        if !cart.apply(command) {
            return Ok(false);
        }
        tracing::debug!(command = name, items = cart.total_item_count(), "cart updated");
        if let Err(error) = self.inner.cache.set(CART_KEY, cart.lines()) {
            tracing::warn!(command = name, %error, "failed to persist cart");
            return Err(error.into());
        }
        Ok(true)
    }

    async fn dispatch_delayed(&self, command: CartCommand) -> Result<bool, CommerceError> {
        let _loading = Loading::start(&self.inner.pending);
        let _turn = self.inner.queue.lock().await;
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }
        self.dispatch(command)
    }

    /// Add `quantity` of `product`.
    pub async fn add_to_cart(&self, product: Product, quantity: i64) -> Result<bool, CommerceError> {
        self.dispatch_delayed(CartCommand::Add { product, quantity })
            .await
    }

    /// Remove the line for `product_id`.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<bool, CommerceError> {
        self.dispatch_delayed(CartCommand::Remove { product_id }).await
    }

    /// Set a line's quantity. Values below 1 return at once without a change.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity < 1 {
            return Ok(false);
        }
        self.dispatch_delayed(CartCommand::SetQuantity {
            product_id,
            quantity,
        })
        .await
    }

    /// Empty the cart.
    pub async fn clear_cart(&self) -> Result<bool, CommerceError> {
        self.dispatch_delayed(CartCommand::Clear).await
    }

    /// Flip a line's checkout selection.
    pub fn toggle_select(&self, product_id: ProductId) -> Result<bool, CommerceError> {
        self.dispatch(CartCommand::ToggleSelect { product_id })
    }

    /// Select or deselect every line.
    pub fn select_all(&self, selected: bool) -> Result<bool, CommerceError> {
        self.dispatch(CartCommand::SelectAll { selected })
    }

    /// True while any async wrapper is waiting or applying.
    pub fn is_loading(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst) > 0
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    /// Total units across all lines.
    pub fn total_item_count(&self) -> i64 {
        self.lock().total_item_count()
    }

    /// Number of selected lines.
    pub fn selected_count(&self) -> usize {
        self.lock().selected_count()
    }

    /// Subtotal of the selected lines.
    pub fn selected_subtotal(&self) -> Result<Money, CommerceError> {
        self.lock().selected_subtotal()
    }

    /// Subtotal of every line.
    pub fn cart_total(&self) -> Result<Money, CommerceError> {
        self.lock().cart_total()
    }

    /// Copy of the selected lines.
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.lock().selected_lines()
    }
}

/// Counts an in-flight wrapper call for as long as it lives.
struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductKind;
    use crate::weight::Weight;
    use proptest::prelude::*;

    fn product(id: i64, price: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {}", id),
            ProductKind::Cd,
            Money::vnd(price),
            Weight::grams(150),
        )
        .with_stock(20)
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let cache = Cache::in_memory();
        let store = CartStore::open(cache.clone(), Duration::ZERO);

        store.add_to_cart(product(1, 1000), 2).await.unwrap();
        store.add_to_cart(product(2, 500), 1).await.unwrap();
        store.toggle_select(ProductId::new(2)).unwrap();

        let stored: Vec<CartLine> = cache.get(CART_KEY).unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(!stored[1].selected);

        let reopened = CartStore::open(cache, Duration::ZERO);
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn test_corrupt_storage_is_empty_cart() {
        let cache = Cache::in_memory();
        cache.set_raw(CART_KEY, b"[{\"product\": oops").unwrap();

        let store = CartStore::open(cache, Duration::ZERO);
        assert_eq!(store.total_item_count(), 0);
    }

    #[tokio::test]
    async fn test_update_quantity_below_one_is_noop() {
        let store = CartStore::in_memory();
        store.add_to_cart(product(1, 1000), 3).await.unwrap();

        assert!(!store.update_quantity(ProductId::new(1), 0).await.unwrap());
        assert_eq!(store.total_item_count(), 3);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let store = CartStore::in_memory();
        store.add_to_cart(product(1, 1000), 1).await.unwrap();
        assert!(store.clear_cart().await.unwrap());
        assert_eq!(store.snapshot(), Cart::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_calls_apply_in_order() {
        let store = CartStore::open(Cache::in_memory(), Duration::from_millis(300));

        let add = store.add_to_cart(product(1, 1000), 1);
        let set = store.update_quantity(ProductId::new(1), 4);
        let remove = store.remove_from_cart(ProductId::new(1));
        let check = async {
            tokio::task::yield_now().await;
            assert!(store.is_loading());
        };

        let (added, set, removed, ()) = futures::join!(add, set, remove, check);
        assert!(added.unwrap());
        assert!(set.unwrap());
        assert!(removed.unwrap());
        assert!(store.snapshot().is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_clones_share_cart() {
        let a = CartStore::in_memory();
        let b = a.clone();
        a.add_to_cart(product(1, 1000), 1).await.unwrap();
        assert_eq!(b.total_item_count(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64, i64),
        Remove(i64),
        SetQuantity(i64, i64),
        Toggle(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1..6i64, -2..5i64).prop_map(|(id, q)| Op::Add(id, q)),
            (1..6i64).prop_map(Op::Remove),
            (1..6i64, -2..8i64).prop_map(|(id, q)| Op::SetQuantity(id, q)),
            (1..6i64).prop_map(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn prop_product_ids_stay_unique(ops in proptest::collection::vec(op(), 0..40)) {
            let store = CartStore::in_memory();
            for op in ops {
                let command = match op {
                    Op::Add(id, q) => CartCommand::Add { product: product(id, 1000), quantity: q },
                    Op::Remove(id) => CartCommand::Remove { product_id: ProductId::new(id) },
                    Op::SetQuantity(id, q) => CartCommand::SetQuantity { product_id: ProductId::new(id), quantity: q },
                    Op::Toggle(id) => CartCommand::ToggleSelect { product_id: ProductId::new(id) },
                };
                store.dispatch(command).unwrap();
            }

            let cart = store.snapshot();
            let mut ids: Vec<_> = cart.lines().iter().map(|l| l.product_id()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
            prop_assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        }

        #[test]
        fn prop_set_quantity_below_one_keeps_quantity(q in i64::MIN..1) {
            let mut cart = Cart::new();
            cart.apply(CartCommand::Add { product: product(1, 1000), quantity: 3 });
            cart.apply(CartCommand::SetQuantity { product_id: ProductId::new(1), quantity: q });
            prop_assert_eq!(cart.line(ProductId::new(1)).map(|l| l.quantity), Some(3));
        }

        #[test]
        fn prop_toggle_moves_exactly_one_subtotal(
            quantities in proptest::collection::vec(1..5i64, 1..6),
            pick in 0usize..6,
        ) {
            let mut cart = Cart::new();
            for (i, q) in quantities.iter().enumerate() {
                cart.apply(CartCommand::Add { product: product(i as i64 + 1, 1500 * (i as i64 + 1)), quantity: *q });
            }
            let target = cart.lines()[pick % quantities.len()].clone();
            let before = cart.selected_subtotal().unwrap();
            cart.apply(CartCommand::ToggleSelect { product_id: target.product_id() });
            let after = cart.selected_subtotal().unwrap();

            prop_assert_eq!(before.amount - after.amount, target.subtotal().unwrap().amount);
        }
    }
}
