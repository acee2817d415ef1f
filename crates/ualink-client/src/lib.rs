// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subscription state for OPC UA clients.
//!
//! Subscriptions and monitored items are identified by client-issued handles
//! locally and by server-assigned handles on the wire. This crate keeps both
//! sides correlated and routes inbound change notifications to the
//! application, in order, one stream per monitored item.
//!
//! # Features
//!
//! - Subscription lifecycle with validated state transitions
//! - Monitored item registry with collision-free client handles
//! - Notification routing with per-item FIFO streams and duplicate suppression
//! - Namespace table hot swap on reconnect
//!
//! # Example
//!
//! ```
//! use ualink_client::{ClientConfig, ClientConnection, ConnectionId, SubscriptionState};
//!
//! let connection = ClientConnection::new(ConnectionId::new(1), ClientConfig::default());
//! let sub = connection.create_default_subscription().unwrap();
//!
//! connection.on_subscription_state_changed(sub, SubscriptionState::ServerConfirmed).unwrap();
//! assert!(connection
//!     .on_subscription_state_changed(sub, SubscriptionState::LocallyCreated)
//!     .is_err());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod subscription;

pub use config::{
    ClientConfig, ClientConfigBuilder, DeadbandSettings, MonitoredItemSettings, MonitoringMode,
    SubscriptionSettings,
};

pub use connection::ClientConnection;

pub use subscription::{
    sort_and_dedup, ClientHandle, ClientSubscriptionHandle, ConnectionId, DataChangeNotification,
    MonitoredItemInformation, MonitoredItemRegistry, NotificationRouter, NotificationStream,
    RawNotification, RouterStats, ServerHandle, StateChange, SubscriptionInformation,
    SubscriptionState,
};
