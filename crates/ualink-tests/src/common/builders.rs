// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Builders for test connections and notifications.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ualink_client::{
    ClientConfig, ClientConnection, ClientHandle, ClientSubscriptionHandle, ConnectionId,
    MonitoredItemSettings, RawNotification, ServerHandle, SubscriptionState,
};
use ualink_core::value::{StatusCode, Variant};

use super::fixtures::NamespaceFixtures;

// =============================================================================
// ConnectionFixture
// =============================================================================

/// A connection with one server-confirmed subscription and its monitored items.
#[derive(Debug)]
pub struct ConnectionFixture {
    /// The connection.
    pub connection: ClientConnection,
    /// The subscription owning every item.
    pub subscription: ClientSubscriptionHandle,
    /// Client handle of each confirmed item, keyed by server handle.
    pub items: HashMap<ServerHandle, ClientHandle>,
}

impl ConnectionFixture {
    /// Returns the client handle confirmed with `server_handle`.
    ///
    /// # Panics
    ///
    /// Panics if no item was confirmed with that server handle.
    pub fn item(&self, server_handle: u32) -> ClientHandle {
        *self
            .items
            .get(&ServerHandle::new(server_handle))
            .unwrap_or_else(|| panic!("no item confirmed with server handle {server_handle}"))
    }

    /// Routes a raw notification through the connection.
    pub fn deliver(&self, raw: RawNotification) -> bool {
        self.connection.on_notification_received(raw).is_some()
    }
}

// =============================================================================
// ConnectionBuilder
// =============================================================================

/// Builder for a [`ConnectionFixture`].
#[derive(Debug, Clone)]
pub struct ConnectionBuilder {
    connection_id: u32,
    config: ClientConfig,
    namespaces: Vec<String>,
    confirmed: Vec<u32>,
    pending: usize,
    item_settings: MonitoredItemSettings,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self {
            connection_id: 1,
            config: ClientConfig::default(),
            namespaces: NamespaceFixtures::standard(),
            confirmed: Vec::new(),
            pending: 0,
            item_settings: MonitoredItemSettings::default(),
        }
    }
}

impl ConnectionBuilder {
    /// Creates a builder with the standard namespace array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection id.
    pub fn connection_id(mut self, id: u32) -> Self {
        self.connection_id = id;
        self
    }

    /// Sets the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the namespace array received from the server.
    pub fn namespaces<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = uris.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a monitored item confirmed with `server_handle`.
    pub fn confirmed_item(mut self, server_handle: u32) -> Self {
        self.confirmed.push(server_handle);
        self
    }

    /// Adds `count` monitored items the server has not confirmed yet.
    pub fn pending_items(mut self, count: usize) -> Self {
        self.pending = count;
        self
    }

    /// Sets the settings used for every monitored item.
    pub fn item_settings(mut self, settings: MonitoredItemSettings) -> Self {
        self.item_settings = settings;
        self
    }

    /// Builds the fixture.
    ///
    /// # Panics
    ///
    /// Panics if the configuration rejects the requested subscription or items.
    pub fn build(self) -> ConnectionFixture {
        let connection = ClientConnection::new(ConnectionId::new(self.connection_id), self.config);
        connection.on_namespace_array_received(&self.namespaces);

        let subscription = connection
            .create_default_subscription()
            .expect("subscription should be created");
        connection
            .on_subscription_state_changed(subscription, SubscriptionState::ServerConfirmed)
            .expect("subscription should be confirmed");

        let mut items = HashMap::new();
        for server_handle in self.confirmed {
            let client_handle = connection
                .create_monitored_item(subscription, self.item_settings.clone())
                .expect("monitored item should be created");
            let server_handle = ServerHandle::new(server_handle);
            connection
                .on_monitored_item_create_confirmed(client_handle, server_handle)
                .expect("monitored item should be confirmed");
            items.insert(server_handle, client_handle);
        }

        for _ in 0..self.pending {
            connection
                .create_monitored_item(subscription, self.item_settings.clone())
                .expect("monitored item should be created");
        }

        ConnectionFixture {
            connection,
            subscription,
            items,
        }
    }
}

// =============================================================================
// RawNotificationBuilder
// =============================================================================

/// Builder for a [`RawNotification`].
#[derive(Debug, Clone)]
pub struct RawNotificationBuilder {
    server_handle: ServerHandle,
    status: StatusCode,
    value: Variant,
    source_timestamp: Option<DateTime<Utc>>,
    server_timestamp: Option<DateTime<Utc>>,
}

impl RawNotificationBuilder {
    /// Creates a builder for a good, empty notification.
    pub fn new(server_handle: u32) -> Self {
        Self {
            server_handle: ServerHandle::new(server_handle),
            status: StatusCode::GOOD,
            value: Variant::Empty,
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    /// Sets the value.
    pub fn value(mut self, value: impl Into<Variant>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the status.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Marks the value bad.
    pub fn bad(self) -> Self {
        self.status(StatusCode::BAD)
    }

    /// Sets the source timestamp.
    pub fn source_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.source_timestamp = Some(timestamp);
        self
    }

    /// Sets the server timestamp.
    pub fn server_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.server_timestamp = Some(timestamp);
        self
    }

    /// Builds the notification.
    pub fn build(self) -> RawNotification {
        RawNotification::new(self.server_handle, self.value)
            .with_status(self.status)
            .with_timestamps(self.source_timestamp, self.server_timestamp)
    }
}
