// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subscription and monitored item registry.
//!
//! The registry correlates client-issued handles with server-assigned ones.
//! It is written by subscription management calls and transport callbacks,
//! and read on every inbound notification, so it sits behind a single
//! `RwLock` and never performs I/O while holding it.
//!
//! # Example
//!
//! ```
//! use ualink_client::config::{ClientConfig, MonitoredItemSettings};
//! use ualink_client::subscription::{ClientSubscriptionHandle, ConnectionId, MonitoredItemRegistry, ServerHandle};
//!
//! let registry = MonitoredItemRegistry::new(&ClientConfig::default());
//! let handle = registry
//!     .register(ConnectionId::new(1), ClientSubscriptionHandle::new(1), MonitoredItemSettings::default())
//!     .unwrap();
//!
//! assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(42)), None);
//! registry.confirm(handle, ServerHandle::new(42)).unwrap();
//! assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(42)), Some(handle));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use ualink_core::error::{NotFoundError, SubscriptionError, UaError, UaResult};

use super::handle::{ClientHandle, ClientSubscriptionHandle, ConnectionId, ServerHandle};
use super::state::{MonitoredItemInformation, SubscriptionInformation, SubscriptionState};
use crate::config::{ClientConfig, MonitoredItemSettings, SubscriptionSettings};

// =============================================================================
// StateChange
// =============================================================================

/// Outcome of [`MonitoredItemRegistry::set_subscription_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// State before the call.
    pub previous: SubscriptionState,

    /// State after the call.
    pub current: SubscriptionState,

    /// Monitored items removed because the subscription was deleted.
    pub removed_items: Vec<ClientHandle>,
}

impl StateChange {
    /// Returns `true` if the state did not change.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

// =============================================================================
// MonitoredItemRegistry
// =============================================================================

#[derive(Debug, Default)]
struct RegistryInner {
    items: BTreeMap<ClientHandle, MonitoredItemInformation>,
    by_server_handle: HashMap<ServerHandle, ClientHandle>,
    subscriptions: BTreeMap<ClientSubscriptionHandle, SubscriptionInformation>,
}

impl RegistryInner {
    fn live_subscriptions(&self) -> usize {
        self.subscriptions
            .values()
            .filter(|s| !s.state.is_terminal())
            .count()
    }

    fn unlink(&mut self, item: &MonitoredItemInformation) {
        if let Some(server_handle) = item.server_handle {
            if self.by_server_handle.get(&server_handle) == Some(&item.client_handle) {
                self.by_server_handle.remove(&server_handle);
            }
        }
    }
}

/// Tracks subscriptions and monitored items of client connections.
pub struct MonitoredItemRegistry {
    inner: RwLock<RegistryInner>,
    next_client_handle: AtomicU64,
    next_subscription_handle: AtomicU64,
    max_monitored_items: usize,
    max_subscriptions: usize,
}

impl MonitoredItemRegistry {
    /// Creates an empty registry with the limits of `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            next_client_handle: AtomicU64::new(u64::from(config.first_client_handle)),
            next_subscription_handle: AtomicU64::new(1),
            max_monitored_items: config.max_monitored_items,
            max_subscriptions: config.max_subscriptions,
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Creates a subscription record in the `LocallyCreated` state.
    ///
    /// # Errors
    ///
    /// [`SubscriptionError::TooManySubscriptions`] if the limit of live
    /// subscriptions is reached.
    pub fn create_subscription(
        &self,
        connection_id: ConnectionId,
        settings: SubscriptionSettings,
    ) -> UaResult<ClientSubscriptionHandle> {
        let mut inner = self.inner.write();

        let live = inner.live_subscriptions();
        if live >= self.max_subscriptions {
            return Err(SubscriptionError::too_many_subscriptions(live + 1, self.max_subscriptions).into());
        }

        let handle = ClientSubscriptionHandle::new(allocate_handle(
            &self.next_subscription_handle,
            "subscription",
        )?);
        inner.subscriptions.insert(
            handle,
            SubscriptionInformation::new(connection_id, handle, settings),
        );

        tracing::info!(
            connection_id = %connection_id,
            subscription = %handle,
            "Subscription created"
        );

        Ok(handle)
    }

    /// Applies a subscription state transition.
    ///
    /// Moving to `Deleted` removes every monitored item of the subscription.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError::Subscription`] for an unknown handle
    /// - [`SubscriptionError::InvalidTransition`] if the lifecycle forbids it
    pub fn set_subscription_state(
        &self,
        handle: ClientSubscriptionHandle,
        state: SubscriptionState,
    ) -> UaResult<StateChange> {
        let mut inner = self.inner.write();

        let subscription = inner
            .subscriptions
            .get_mut(&handle)
            .ok_or_else(|| NotFoundError::subscription(handle.value()))?;

        let previous = subscription.state;
        if let Err(e) = subscription.transition_to(state) {
            tracing::warn!(
                subscription = %handle,
                from = %previous,
                to = %state,
                "Rejected subscription state transition"
            );
            return Err(e.into());
        }

        let mut removed_items = Vec::new();
        if state.is_terminal() && !previous.is_terminal() {
            let owned: Vec<ClientHandle> = inner
                .items
                .values()
                .filter(|item| item.subscription_handle == handle)
                .map(|item| item.client_handle)
                .collect();

            for client_handle in owned {
                if let Some(item) = inner.items.remove(&client_handle) {
                    inner.unlink(&item);
                    removed_items.push(client_handle);
                }
            }

            tracing::info!(
                subscription = %handle,
                removed_items = removed_items.len(),
                "Subscription deleted"
            );
        } else if previous != state {
            tracing::debug!(
                subscription = %handle,
                from = %previous,
                to = %state,
                "Subscription state changed"
            );
        }

        Ok(StateChange {
            previous,
            current: state,
            removed_items,
        })
    }

    /// Returns a copy of a subscription record.
    pub fn subscription(&self, handle: ClientSubscriptionHandle) -> Option<SubscriptionInformation> {
        self.inner.read().subscriptions.get(&handle).cloned()
    }

    /// Returns all subscription records, sorted.
    pub fn subscriptions(&self) -> Vec<SubscriptionInformation> {
        let mut subscriptions: Vec<_> = self.inner.read().subscriptions.values().cloned().collect();
        subscriptions.sort_by(SubscriptionInformation::compare);
        subscriptions
    }

    // =========================================================================
    // Monitored Items
    // =========================================================================

    /// Registers a monitored item and returns its fresh client handle.
    ///
    /// The server handle stays unassigned until [`confirm`](Self::confirm).
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::TooManyMonitoredItems`] if the limit is reached
    /// - [`SubscriptionError::Deleted`] if the subscription is known to be deleted
    pub fn register(
        &self,
        connection_id: ConnectionId,
        subscription_handle: ClientSubscriptionHandle,
        settings: MonitoredItemSettings,
    ) -> UaResult<ClientHandle> {
        let mut inner = self.inner.write();

        if inner.items.len() >= self.max_monitored_items {
            return Err(SubscriptionError::too_many_monitored_items(
                inner.items.len() + 1,
                self.max_monitored_items,
            )
            .into());
        }

        if let Some(subscription) = inner.subscriptions.get(&subscription_handle) {
            if subscription.state.is_terminal() {
                return Err(SubscriptionError::deleted(subscription_handle.value()).into());
            }
        }

        let client_handle =
            ClientHandle::new(allocate_handle(&self.next_client_handle, "client")?);
        inner.items.insert(
            client_handle,
            MonitoredItemInformation {
                connection_id,
                subscription_handle,
                client_handle,
                server_handle: None,
                settings,
            },
        );

        tracing::debug!(
            connection_id = %connection_id,
            subscription = %subscription_handle,
            client_handle = %client_handle,
            "Monitored item registered"
        );

        Ok(client_handle)
    }

    /// Records the server handle assigned to a monitored item.
    ///
    /// A server handle previously mapped to another item is taken over by
    /// this one.
    ///
    /// # Errors
    ///
    /// [`NotFoundError::MonitoredItem`] for an unknown client handle.
    pub fn confirm(&self, client_handle: ClientHandle, server_handle: ServerHandle) -> UaResult<()> {
        let mut inner = self.inner.write();
        let inner = &mut *inner;

        let item = inner
            .items
            .get_mut(&client_handle)
            .ok_or_else(|| UaError::monitored_item_not_found(client_handle.value()))?;

        if let Some(old) = item.server_handle.replace(server_handle) {
            if old != server_handle {
                inner.by_server_handle.remove(&old);
            }
        }

        if let Some(previous_owner) = inner.by_server_handle.insert(server_handle, client_handle) {
            if previous_owner != client_handle {
                tracing::warn!(
                    server_handle = %server_handle,
                    previous = %previous_owner,
                    current = %client_handle,
                    "Server handle reassigned"
                );
                if let Some(other) = inner.items.get_mut(&previous_owner) {
                    other.server_handle = None;
                }
            }
        }

        tracing::debug!(
            client_handle = %client_handle,
            server_handle = %server_handle,
            "Monitored item confirmed"
        );

        Ok(())
    }

    /// Looks up the client handle owning a server handle.
    #[inline]
    pub fn lookup_by_server_handle(&self, server_handle: ServerHandle) -> Option<ClientHandle> {
        self.inner.read().by_server_handle.get(&server_handle).copied()
    }

    /// Removes a monitored item and its server handle mapping.
    ///
    /// # Errors
    ///
    /// [`NotFoundError::MonitoredItem`] for an unknown client handle.
    pub fn remove(&self, client_handle: ClientHandle) -> UaResult<MonitoredItemInformation> {
        let mut inner = self.inner.write();
        let item = inner
            .items
            .remove(&client_handle)
            .ok_or_else(|| NotFoundError::monitored_item(client_handle.value()))?;
        inner.unlink(&item);

        tracing::debug!(client_handle = %client_handle, "Monitored item removed");
        Ok(item)
    }

    /// Returns a copy of a monitored item record.
    pub fn monitored_item(&self, client_handle: ClientHandle) -> Option<MonitoredItemInformation> {
        self.inner.read().items.get(&client_handle).cloned()
    }

    /// Returns all monitored item records, sorted.
    pub fn monitored_items(&self) -> Vec<MonitoredItemInformation> {
        let mut items: Vec<_> = self.inner.read().items.values().cloned().collect();
        items.sort_by(MonitoredItemInformation::compare);
        items
    }

    /// Returns the monitored items of one subscription, sorted.
    pub fn monitored_items_of(
        &self,
        subscription_handle: ClientSubscriptionHandle,
    ) -> Vec<MonitoredItemInformation> {
        let mut items: Vec<_> = self
            .inner
            .read()
            .items
            .values()
            .filter(|item| item.subscription_handle == subscription_handle)
            .cloned()
            .collect();
        items.sort_by(MonitoredItemInformation::compare);
        items
    }

    /// Returns the number of registered monitored items.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Returns `true` if no monitored items are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }
}

/// Issues the next handle from `counter`, never wrapping past `u32::MAX`.
fn allocate_handle(counter: &AtomicU64, kind: &'static str) -> UaResult<u32> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
            (next <= u64::from(u32::MAX)).then_some(next + 1)
        })
        .ok()
        .and_then(|handle| u32::try_from(handle).ok())
        .ok_or_else(|| {
            tracing::error!(kind, "Handle range exhausted");
            SubscriptionError::handles_exhausted(kind).into()
        })
}

impl fmt::Debug for MonitoredItemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MonitoredItemRegistry")
            .field("monitored_items", &inner.items.len())
            .field("subscriptions", &inner.subscriptions.len())
            .field("max_monitored_items", &self.max_monitored_items)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const CONN: ConnectionId = ConnectionId::new(1);

    fn registry() -> MonitoredItemRegistry {
        MonitoredItemRegistry::new(&ClientConfig::default())
    }

    #[test]
    fn test_register_and_confirm() {
        let registry = registry();
        let sub = ClientSubscriptionHandle::new(1);

        let handle = registry
            .register(CONN, sub, MonitoredItemSettings::default())
            .unwrap();
        assert_eq!(handle, ClientHandle::new(1));
        assert!(!registry.monitored_item(handle).unwrap().is_assigned());
        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(42)), None);

        registry.confirm(handle, ServerHandle::new(42)).unwrap();
        assert_eq!(
            registry.lookup_by_server_handle(ServerHandle::new(42)),
            Some(handle)
        );
        assert_eq!(
            registry.monitored_item(handle).unwrap().server_handle,
            Some(ServerHandle::new(42))
        );
    }

    #[test]
    fn test_handles_start_at_configured_value() {
        let config = ClientConfig::builder().first_client_handle(500).build().unwrap();
        let registry = MonitoredItemRegistry::new(&config);

        let a = registry
            .register(CONN, ClientSubscriptionHandle::new(1), MonitoredItemSettings::default())
            .unwrap();
        let b = registry
            .register(CONN, ClientSubscriptionHandle::new(1), MonitoredItemSettings::default())
            .unwrap();
        assert_eq!(a, ClientHandle::new(500));
        assert_eq!(b, ClientHandle::new(501));
    }

    #[test]
    fn test_client_handles_never_wrap() {
        let config = ClientConfig::builder()
            .first_client_handle(u32::MAX)
            .build()
            .unwrap();
        let registry = MonitoredItemRegistry::new(&config);
        let sub = ClientSubscriptionHandle::new(1);

        let last = registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();
        assert_eq!(last, ClientHandle::new(u32::MAX));

        for _ in 0..2 {
            let err = registry
                .register(CONN, sub, MonitoredItemSettings::default())
                .unwrap_err();
            assert!(matches!(
                err,
                UaError::Subscription(SubscriptionError::HandlesExhausted { kind: "client" })
            ));
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.monitored_item(ClientHandle::new(0)).is_none());
        assert_eq!(
            registry.monitored_item(last).unwrap().client_handle,
            ClientHandle::new(u32::MAX)
        );
    }

    #[test]
    fn test_confirm_unknown_handle() {
        let registry = registry();
        let err = registry
            .confirm(ClientHandle::new(99), ServerHandle::new(1))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_reconfirm_replaces_server_handle() {
        let registry = registry();
        let handle = registry
            .register(CONN, ClientSubscriptionHandle::new(1), MonitoredItemSettings::default())
            .unwrap();

        registry.confirm(handle, ServerHandle::new(1)).unwrap();
        registry.confirm(handle, ServerHandle::new(2)).unwrap();

        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(1)), None);
        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(2)), Some(handle));
    }

    #[test]
    fn test_server_handle_taken_over() {
        let registry = registry();
        let sub = ClientSubscriptionHandle::new(1);
        let a = registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();
        let b = registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();

        registry.confirm(a, ServerHandle::new(7)).unwrap();
        registry.confirm(b, ServerHandle::new(7)).unwrap();

        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(7)), Some(b));
        assert_eq!(registry.monitored_item(a).unwrap().server_handle, None);

        // removing the old owner must not unmap the new one
        registry.remove(a).unwrap();
        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(7)), Some(b));
    }

    #[test]
    fn test_remove_unknown_handle_is_not_found() {
        let registry = registry();
        let handle = registry
            .register(CONN, ClientSubscriptionHandle::new(1), MonitoredItemSettings::default())
            .unwrap();
        registry.confirm(handle, ServerHandle::new(5)).unwrap();

        assert_eq!(registry.remove(handle).unwrap().client_handle, handle);
        assert!(registry.remove(handle).unwrap_err().is_not_found());
        assert!(registry.remove(ClientHandle::new(12345)).unwrap_err().is_not_found());
        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(5)), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_monitored_item_limit() {
        let config = ClientConfig::builder().max_monitored_items(2).build().unwrap();
        let registry = MonitoredItemRegistry::new(&config);
        let sub = ClientSubscriptionHandle::new(1);

        registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();
        registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();
        let err = registry
            .register(CONN, sub, MonitoredItemSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            UaError::Subscription(SubscriptionError::TooManyMonitoredItems { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_subscription_lifecycle() {
        let registry = registry();
        let sub = registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .unwrap();
        assert_eq!(
            registry.subscription(sub).unwrap().state,
            SubscriptionState::LocallyCreated
        );

        let change = registry
            .set_subscription_state(sub, SubscriptionState::ServerConfirmed)
            .unwrap();
        assert_eq!(change.previous, SubscriptionState::LocallyCreated);
        assert!(!change.is_noop());

        let change = registry
            .set_subscription_state(sub, SubscriptionState::ServerConfirmed)
            .unwrap();
        assert!(change.is_noop());

        let err = registry
            .set_subscription_state(sub, SubscriptionState::LocallyCreated)
            .unwrap_err();
        assert_eq!(err.category(), "subscription");
        assert_eq!(
            registry.subscription(sub).unwrap().state,
            SubscriptionState::ServerConfirmed
        );
    }

    #[test]
    fn test_unknown_subscription_state_change() {
        let registry = registry();
        let err = registry
            .set_subscription_state(ClientSubscriptionHandle::new(9), SubscriptionState::Deleted)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_subscription_removes_items() {
        let registry = registry();
        let sub = registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .unwrap();
        let other = registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .unwrap();

        let a = registry.register(CONN, sub, MonitoredItemSettings::default()).unwrap();
        let b = registry.register(CONN, other, MonitoredItemSettings::default()).unwrap();
        registry.confirm(a, ServerHandle::new(10)).unwrap();

        let change = registry
            .set_subscription_state(sub, SubscriptionState::Deleted)
            .unwrap();
        assert_eq!(change.removed_items, vec![a]);
        assert_eq!(registry.lookup_by_server_handle(ServerHandle::new(10)), None);
        assert!(registry.monitored_item(b).is_some());

        let err = registry
            .register(CONN, sub, MonitoredItemSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            UaError::Subscription(SubscriptionError::Deleted { .. })
        ));
    }

    #[test]
    fn test_subscription_limit_counts_live_only() {
        let config = ClientConfig::builder().max_subscriptions(1).build().unwrap();
        let registry = MonitoredItemRegistry::new(&config);

        let sub = registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .unwrap();
        assert!(registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .is_err());

        registry
            .set_subscription_state(sub, SubscriptionState::Deleted)
            .unwrap();
        assert!(registry
            .create_subscription(CONN, SubscriptionSettings::default())
            .is_ok());
    }

    #[test]
    fn test_snapshots_are_sorted() {
        let registry = registry();
        let s1 = ClientSubscriptionHandle::new(2);
        let s2 = ClientSubscriptionHandle::new(1);
        registry.register(CONN, s1, MonitoredItemSettings::default()).unwrap();
        registry.register(CONN, s2, MonitoredItemSettings::default()).unwrap();
        registry.register(ConnectionId::new(0), s1, MonitoredItemSettings::default()).unwrap();

        let items = registry.monitored_items();
        for pair in items.windows(2) {
            assert!(pair[0].compare(&pair[1]).is_le());
        }
        assert_eq!(items[0].connection_id, ConnectionId::new(0));
        assert_eq!(registry.monitored_items_of(s1).len(), 2);
    }

    #[test]
    fn test_concurrent_register_unique_handles() {
        let registry = Arc::new(registry());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..200)
                        .map(|_| {
                            registry
                                .register(
                                    ConnectionId::new(t),
                                    ClientSubscriptionHandle::new(1),
                                    MonitoredItemSettings::default(),
                                )
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for thread in threads {
            for handle in thread.join().unwrap() {
                assert!(seen.insert(handle), "duplicate handle {}", handle);
            }
        }
        assert_eq!(seen.len(), 1600);
        assert_eq!(registry.len(), 1600);
    }
}
