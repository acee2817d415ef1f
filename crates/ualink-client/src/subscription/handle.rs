// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Handle types.
//!
//! Client handles are issued locally and never reused within a registry.
//! Server handles are assigned by the server when it confirms an item.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    /// Creates a new connection ID.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl From<u32> for ConnectionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Client-issued subscription handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientSubscriptionHandle(pub u32);

impl ClientSubscriptionHandle {
    /// Creates a new subscription handle.
    #[inline]
    pub const fn new(handle: u32) -> Self {
        Self(handle)
    }

    /// Returns the raw handle value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClientSubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

impl From<u32> for ClientSubscriptionHandle {
    fn from(handle: u32) -> Self {
        Self(handle)
    }
}

/// Client-issued monitored item handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientHandle(pub u32);

impl ClientHandle {
    /// Creates a new client handle.
    #[inline]
    pub const fn new(handle: u32) -> Self {
        Self(handle)
    }

    /// Returns the raw handle value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mi-{}", self.0)
    }
}

impl From<u32> for ClientHandle {
    fn from(handle: u32) -> Self {
        Self(handle)
    }
}

/// Server-assigned monitored item handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerHandle(pub u32);

impl ServerHandle {
    /// Creates a new server handle.
    #[inline]
    pub const fn new(handle: u32) -> Self {
        Self(handle)
    }

    /// Returns the raw handle value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "srv-{}", self.0)
    }
}

impl From<u32> for ServerHandle {
    fn from(handle: u32) -> Self {
        Self(handle)
    }
}
