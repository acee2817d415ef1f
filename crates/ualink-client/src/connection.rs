// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-connection facade.
//!
//! [`ClientConnection`] owns the namespace table, the registry and the
//! router of one client connection. The transport drives it through the
//! `on_*` callbacks; applications resolve addresses, create monitored items
//! and consume notification streams through the remaining methods.
//!
//! # Example
//!
//! ```
//! use ualink_client::config::{ClientConfig, MonitoredItemSettings, SubscriptionSettings};
//! use ualink_client::connection::ClientConnection;
//! use ualink_client::subscription::{ConnectionId, RawNotification, ServerHandle};
//! use ualink_core::types::NodeId;
//!
//! let connection = ClientConnection::new(ConnectionId::new(1), ClientConfig::default());
//! connection.on_namespace_array_received(["http://opcfoundation.org/UA/", "urn:plant"]);
//!
//! let wire = connection.resolve_address(&NodeId::with_uri("urn:plant", "Pump.Speed")).unwrap();
//! assert_eq!(wire.namespace_index, 1);
//!
//! let sub = connection.create_subscription(SubscriptionSettings::default()).unwrap();
//! let item = connection.create_monitored_item(sub, MonitoredItemSettings::default()).unwrap();
//! connection.on_monitored_item_create_confirmed(item, ServerHandle::new(900)).unwrap();
//!
//! let mut stream = connection.notifications(item).unwrap();
//! connection.on_notification_received(RawNotification::new(ServerHandle::new(900), 1480.0));
//! assert!(stream.try_next().is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use ualink_core::error::UaResult;
use ualink_core::namespace::NamespaceTable;
use ualink_core::resolver::{AddressResolver, Resolve};
use ualink_core::types::{NodeId, WireIdentifier};
use ualink_core::value::{StatusCode, Variant};

use crate::config::{ClientConfig, MonitoredItemSettings, SubscriptionSettings};
use crate::subscription::{
    ClientHandle, ClientSubscriptionHandle, ConnectionId, DataChangeNotification,
    MonitoredItemRegistry, NotificationRouter, NotificationStream, RawNotification, RouterStats,
    ServerHandle, StateChange, SubscriptionState,
};

// =============================================================================
// ClientConnection
// =============================================================================

/// Address resolution and subscription state of one client connection.
pub struct ClientConnection {
    connection_id: ConnectionId,
    config: ClientConfig,
    namespaces: ArcSwap<NamespaceTable>,
    registry: Arc<MonitoredItemRegistry>,
    router: NotificationRouter,
}

impl ClientConnection {
    /// Creates a connection with an empty namespace table.
    pub fn new(connection_id: ConnectionId, config: ClientConfig) -> Self {
        let registry = Arc::new(MonitoredItemRegistry::new(&config));
        let router = NotificationRouter::new(
            Arc::clone(&registry),
            config.suppress_duplicate_notifications,
        );

        Self {
            connection_id,
            config,
            namespaces: ArcSwap::from_pointee(NamespaceTable::default()),
            registry,
            router,
        }
    }

    /// Returns the connection ID.
    #[inline]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Transport callbacks
    // =========================================================================

    /// Replaces the namespace table with one built from `uris`.
    ///
    /// Resolutions already in progress finish on the previous table.
    pub fn on_namespace_array_received<I, S>(&self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.install_namespace_table(NamespaceTable::build(uris));
    }

    /// Replaces the namespace table from the result of reading the
    /// NamespaceArray node. On error the current table is kept.
    pub fn on_namespace_array_read(&self, status: StatusCode, value: &Variant) -> UaResult<()> {
        match NamespaceTable::from_data_value(status, value) {
            Ok(table) => {
                self.install_namespace_table(table);
                Ok(())
            }
            Err(e) => {
                e.log("namespace array read");
                Err(e)
            }
        }
    }

    fn install_namespace_table(&self, table: NamespaceTable) {
        tracing::info!(
            connection_id = %self.connection_id,
            namespaces = table.len(),
            "Namespace table replaced"
        );
        self.namespaces.store(Arc::new(table));
    }

    /// Records the server handle of a confirmed monitored item.
    pub fn on_monitored_item_create_confirmed(
        &self,
        client_handle: ClientHandle,
        server_handle: ServerHandle,
    ) -> UaResult<()> {
        self.registry.confirm(client_handle, server_handle)
    }

    /// Routes an inbound notification.
    pub fn on_notification_received(
        &self,
        raw: RawNotification,
    ) -> Option<(DataChangeNotification, ClientHandle)> {
        self.router.route(raw)
    }

    /// Applies a subscription state change reported by the session.
    ///
    /// Deleting a subscription closes the streams of its monitored items.
    pub fn on_subscription_state_changed(
        &self,
        handle: ClientSubscriptionHandle,
        state: SubscriptionState,
    ) -> UaResult<StateChange> {
        let change = self.registry.set_subscription_state(handle, state)?;
        for client_handle in &change.removed_items {
            self.router.detach(*client_handle);
        }
        Ok(change)
    }

    // =========================================================================
    // Address resolution
    // =========================================================================

    /// Returns the current namespace table.
    pub fn namespace_table(&self) -> Arc<NamespaceTable> {
        self.namespaces.load_full()
    }

    /// Resolves a NodeId, QualifiedName, RelativePathElement or Address to
    /// its wire form against the current namespace table.
    pub fn resolve_address<T: Resolve + ?Sized>(&self, target: &T) -> UaResult<T::Output> {
        let table = self.namespaces.load_full();
        AddressResolver::new(&table).resolve(target)
    }

    /// Decodes a wire identifier into a NodeId carrying namespace index and URI.
    pub fn decode_wire_node_id(
        &self,
        namespace_index: u16,
        identifier: WireIdentifier,
    ) -> UaResult<NodeId> {
        let table = self.namespaces.load_full();
        AddressResolver::new(&table).decode_node_id(namespace_index, identifier)
    }

    // =========================================================================
    // Subscriptions and monitored items
    // =========================================================================

    /// Creates a subscription record owned by this connection.
    pub fn create_subscription(
        &self,
        settings: SubscriptionSettings,
    ) -> UaResult<ClientSubscriptionHandle> {
        settings.validate()?;
        self.registry.create_subscription(self.connection_id, settings)
    }

    /// Creates a subscription with the configured default settings.
    pub fn create_default_subscription(&self) -> UaResult<ClientSubscriptionHandle> {
        self.create_subscription(self.config.default_subscription.clone())
    }

    /// Deletes a subscription and its monitored items.
    pub fn delete_subscription(&self, handle: ClientSubscriptionHandle) -> UaResult<StateChange> {
        self.on_subscription_state_changed(handle, SubscriptionState::Deleted)
    }

    /// Registers a monitored item and opens its notification channel.
    pub fn create_monitored_item(
        &self,
        subscription_handle: ClientSubscriptionHandle,
        settings: MonitoredItemSettings,
    ) -> UaResult<ClientHandle> {
        settings.validate()?;
        let client_handle =
            self.registry
                .register(self.connection_id, subscription_handle, settings)?;
        self.router.attach(client_handle);
        Ok(client_handle)
    }

    /// Registers a monitored item with the configured default settings.
    pub fn create_default_monitored_item(
        &self,
        subscription_handle: ClientSubscriptionHandle,
    ) -> UaResult<ClientHandle> {
        self.create_monitored_item(
            subscription_handle,
            self.config.default_monitored_item.clone(),
        )
    }

    /// Removes a monitored item and closes its stream.
    ///
    /// # Errors
    ///
    /// [`NotFoundError::MonitoredItem`](ualink_core::error::NotFoundError::MonitoredItem)
    /// for an unknown client handle.
    pub fn remove_monitored_item(&self, client_handle: ClientHandle) -> UaResult<()> {
        self.router.detach(client_handle);
        self.registry.remove(client_handle)?;
        Ok(())
    }

    /// Takes the notification stream of a monitored item.
    ///
    /// The stream can be taken once; notifications routed before that are
    /// buffered.
    pub fn notifications(&self, client_handle: ClientHandle) -> UaResult<NotificationStream> {
        self.router.take_stream(client_handle)
    }

    /// Returns the registry for read-only snapshots.
    #[inline]
    pub fn registry(&self) -> &MonitoredItemRegistry {
        &self.registry
    }

    /// Returns routing statistics.
    #[inline]
    pub fn router_stats(&self) -> &RouterStats {
        self.router.stats()
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("connection_id", &self.connection_id)
            .field("namespaces", &self.namespaces.load().len())
            .field("registry", &self.registry)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
