// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Notification routing.
//!
//! ```text
//!   transport ──RawNotification──► NotificationRouter ──► NotificationStream (mi-1)
//!                                        │           └──► NotificationStream (mi-2)
//!                                        ▼
//!                              MonitoredItemRegistry
//!                           (server handle → client handle)
//! ```
//!
//! Every monitored item gets one unbounded FIFO channel when it is attached.
//! Notifications routed before the application takes the stream are buffered
//! in the channel. Unroutable notifications are dropped and counted; they are
//! never reported as errors.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use ualink_core::error::{NotFoundError, SubscriptionError, UaResult};

use super::handle::ClientHandle;
use super::notification::{DataChangeNotification, RawNotification};
use super::registry::MonitoredItemRegistry;

// =============================================================================
// NotificationStream
// =============================================================================

/// Ordered stream of notifications for one monitored item.
///
/// Ends once the monitored item is removed and all buffered notifications
/// have been consumed.
#[derive(Debug)]
pub struct NotificationStream {
    client_handle: ClientHandle,
    receiver: mpsc::UnboundedReceiver<DataChangeNotification>,
}

impl NotificationStream {
    /// Returns the client handle of the monitored item.
    #[inline]
    pub fn client_handle(&self) -> ClientHandle {
        self.client_handle
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once the monitored item has been removed and the
    /// buffer is drained.
    pub async fn next(&mut self) -> Option<DataChangeNotification> {
        self.receiver.recv().await
    }

    /// Returns the next buffered notification without waiting.
    pub fn try_next(&mut self) -> Option<DataChangeNotification> {
        self.receiver.try_recv().ok()
    }

    /// Drains every buffered notification without waiting.
    pub fn drain(&mut self) -> Vec<DataChangeNotification> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

// =============================================================================
// RouterStats
// =============================================================================

/// Routing counters.
#[derive(Debug, Default)]
pub struct RouterStats {
    routed: AtomicU64,
    dropped: AtomicU64,
    duplicates: AtomicU64,
    undeliverable: AtomicU64,
}

impl RouterStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_routed(&self) {
        self.routed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    fn record_undeliverable(&self) {
        self.undeliverable.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of notifications forwarded to a consumer.
    pub fn routed(&self) -> u64 {
        self.routed.load(Ordering::Relaxed)
    }

    /// Returns the number of notifications whose server handle was unknown.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of suppressed duplicates.
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Returns the number of notifications resolved to an item whose
    /// consumer was gone.
    pub fn undeliverable(&self) -> u64 {
        self.undeliverable.load(Ordering::Relaxed)
    }
}

// =============================================================================
// NotificationRouter
// =============================================================================

struct Consumer {
    sender: mpsc::UnboundedSender<DataChangeNotification>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<DataChangeNotification>>>,
    last_delivered: Mutex<Option<DataChangeNotification>>,
}

/// Routes raw notifications to the streams of their monitored items.
pub struct NotificationRouter {
    registry: Arc<MonitoredItemRegistry>,
    consumers: RwLock<HashMap<ClientHandle, Consumer>>,
    suppress_duplicates: bool,
    stats: RouterStats,
}

impl NotificationRouter {
    /// Creates a router over a registry.
    pub fn new(registry: Arc<MonitoredItemRegistry>, suppress_duplicates: bool) -> Self {
        Self {
            registry,
            consumers: RwLock::new(HashMap::new()),
            suppress_duplicates,
            stats: RouterStats::new(),
        }
    }

    /// Opens the channel of a monitored item. Attaching twice is a no-op.
    pub fn attach(&self, client_handle: ClientHandle) {
        self.consumers.write().entry(client_handle).or_insert_with(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            Consumer {
                sender,
                receiver: Mutex::new(Some(receiver)),
                last_delivered: Mutex::new(None),
            }
        });
    }

    /// Closes the channel of a monitored item.
    ///
    /// A stream already taken ends after its buffered notifications.
    pub fn detach(&self, client_handle: ClientHandle) {
        self.consumers.write().remove(&client_handle);
    }

    /// Takes the notification stream of a monitored item.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError::MonitoredItem`] if the item is not attached
    /// - [`SubscriptionError::StreamTaken`] if the stream was already taken
    pub fn take_stream(&self, client_handle: ClientHandle) -> UaResult<NotificationStream> {
        let consumers = self.consumers.read();
        let consumer = consumers
            .get(&client_handle)
            .ok_or_else(|| NotFoundError::monitored_item(client_handle.value()))?;

        let receiver = consumer
            .receiver
            .lock()
            .take()
            .ok_or_else(|| SubscriptionError::stream_taken(client_handle.value()))?;

        Ok(NotificationStream {
            client_handle,
            receiver,
        })
    }

    /// Routes a raw notification to its monitored item.
    ///
    /// Returns the delivered notification and its client handle, or `None`
    /// if the server handle is unknown or the notification was suppressed
    /// as a duplicate.
    pub fn route(&self, raw: RawNotification) -> Option<(DataChangeNotification, ClientHandle)> {
        let server_handle = raw.server_handle;
        let Some(client_handle) = self.registry.lookup_by_server_handle(server_handle) else {
            self.stats.record_dropped();
            tracing::debug!(server_handle = %server_handle, "Dropped unroutable notification");
            return None;
        };

        let notification = raw.into_notification(client_handle);

        let consumers = self.consumers.read();
        let Some(consumer) = consumers.get(&client_handle) else {
            self.stats.record_undeliverable();
            tracing::debug!(client_handle = %client_handle, "No consumer attached");
            return Some((notification, client_handle));
        };

        // Held across the send so that concurrent routes keep FIFO order.
        let mut last = consumer.last_delivered.lock();
        if self.suppress_duplicates && (*last).as_ref() == Some(&notification) {
            self.stats.record_duplicate();
            tracing::trace!(client_handle = %client_handle, "Suppressed duplicate notification");
            return None;
        }

        if consumer.sender.send(notification.clone()).is_err() {
            self.stats.record_undeliverable();
            tracing::debug!(client_handle = %client_handle, "Notification stream closed");
        } else {
            self.stats.record_routed();
            tracing::trace!(
                client_handle = %client_handle,
                status = %notification.status,
                "Notification routed"
            );
        }
        *last = Some(notification.clone());

        Some((notification, client_handle))
    }

    /// Returns the registry used for handle lookup.
    #[inline]
    pub fn registry(&self) -> &Arc<MonitoredItemRegistry> {
        &self.registry
    }

    /// Returns routing statistics.
    #[inline]
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }
}

impl fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRouter")
            .field("consumers", &self.consumers.read().len())
            .field("suppress_duplicates", &self.suppress_duplicates)
            .field("routed", &self.stats.routed())
            .field("dropped", &self.stats.dropped())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, MonitoredItemSettings};
    use crate::subscription::handle::{ClientSubscriptionHandle, ConnectionId, ServerHandle};
    use ualink_core::error::UaError;
    use ualink_core::value::{StatusCode, Variant};

    fn setup(suppress: bool) -> (NotificationRouter, ClientHandle) {
        let registry = Arc::new(MonitoredItemRegistry::new(&ClientConfig::default()));
        let router = NotificationRouter::new(Arc::clone(&registry), suppress);

        let handle = registry
            .register(
                ConnectionId::new(1),
                ClientSubscriptionHandle::new(1),
                MonitoredItemSettings::default(),
            )
            .unwrap();
        registry.confirm(handle, ServerHandle::new(42)).unwrap();
        router.attach(handle);

        (router, handle)
    }

    #[test]
    fn test_route_resolves_client_handle() {
        let (router, handle) = setup(true);

        let (notification, routed_to) = router
            .route(RawNotification::new(ServerHandle::new(42), 21.5))
            .unwrap();
        assert_eq!(routed_to, handle);
        assert_eq!(notification.client_handle, handle);
        assert_eq!(router.stats().routed(), 1);
    }

    #[test]
    fn test_unknown_server_handle_is_dropped() {
        let (router, _) = setup(true);

        assert!(router
            .route(RawNotification::new(ServerHandle::new(7), 1.0))
            .is_none());
        assert_eq!(router.stats().dropped(), 1);
        assert_eq!(router.stats().routed(), 0);
    }

    #[test]
    fn test_duplicate_suppression() {
        let (router, _) = setup(true);
        let raw = RawNotification::new(ServerHandle::new(42), 1.0);

        assert!(router.route(raw.clone()).is_some());
        assert!(router.route(raw.clone()).is_none());
        assert_eq!(router.stats().duplicates(), 1);

        let changed = raw.with_status(StatusCode::UNCERTAIN);
        assert!(router.route(changed).is_some());
        assert_eq!(router.stats().routed(), 2);
    }

    #[test]
    fn test_duplicates_pass_when_not_suppressed() {
        let (router, handle) = setup(false);
        let raw = RawNotification::new(ServerHandle::new(42), 1.0);

        router.route(raw.clone());
        router.route(raw);

        let mut stream = router.take_stream(handle).unwrap();
        assert_eq!(stream.drain().len(), 2);
        assert_eq!(router.stats().duplicates(), 0);
    }

    #[test]
    fn test_stream_can_only_be_taken_once() {
        let (router, handle) = setup(true);

        assert!(router.take_stream(handle).is_ok());
        let err = router.take_stream(handle).unwrap_err();
        assert!(matches!(
            err,
            UaError::Subscription(SubscriptionError::StreamTaken { .. })
        ));
    }

    #[test]
    fn test_take_stream_unknown_handle() {
        let (router, _) = setup(true);
        let err = router.take_stream(ClientHandle::new(999)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_undeliverable_after_stream_dropped() {
        let (router, handle) = setup(true);
        drop(router.take_stream(handle).unwrap());

        let result = router.route(RawNotification::new(ServerHandle::new(42), 1.0));
        assert!(result.is_some());
        assert_eq!(router.stats().undeliverable(), 1);
    }

    #[tokio::test]
    async fn test_stream_is_fifo_and_ends_on_detach() {
        let (router, handle) = setup(true);

        for i in 0..5 {
            router.route(RawNotification::new(ServerHandle::new(42), i));
        }
        let mut stream = router.take_stream(handle).unwrap();
        router.route(RawNotification::new(ServerHandle::new(42), 5));
        router.detach(handle);

        for i in 0..6 {
            let notification = stream.next().await.unwrap();
            assert_eq!(notification.value, Variant::from(i));
        }
        assert!(stream.next().await.is_none());
    }
}
