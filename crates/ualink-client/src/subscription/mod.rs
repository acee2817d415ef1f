// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subscription, monitored item and notification state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     MonitoredItemRegistry                       │
//! │     subscriptions · monitored items · server → client handles   │
//! └─────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ lookup_by_server_handle
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      NotificationRouter                         │
//! │          one FIFO channel per monitored item, statistics        │
//! └─────────────────────────────────────────────────────────────────┘
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │  Notification   │ │  Notification   │ │  Notification   │
//! │  Stream (mi-1)  │ │  Stream (mi-2)  │ │  Stream (mi-3)  │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```

pub mod handle;
pub mod notification;
pub mod registry;
pub mod router;
pub mod state;

pub use handle::{ClientHandle, ClientSubscriptionHandle, ConnectionId, ServerHandle};
pub use notification::{sort_and_dedup, DataChangeNotification, RawNotification};
pub use registry::{MonitoredItemRegistry, StateChange};
pub use router::{NotificationRouter, NotificationStream, RouterStats};
pub use state::{MonitoredItemInformation, SubscriptionInformation, SubscriptionState};
