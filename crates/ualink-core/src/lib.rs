// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Namespace and address resolution for OPC UA clients.
//!
//! OPC UA servers partition their address space into namespaces. Clients can
//! name a namespace by its URI, which is stable, or by its index, which is
//! only valid for the current session. This crate turns either form into the
//! canonical wire identifier for the live session, and decodes wire
//! identifiers back into URI-qualified addresses.
//!
//! # Modules
//!
//! - [`types`]: application and wire address types
//! - [`value`]: status codes and values
//! - [`namespace`]: the session's namespace table
//! - [`resolver`]: address resolution against a namespace table
//! - [`error`]: the error hierarchy shared by the workspace
//!
//! # Error Handling
//!
//! ```text
//! UaError
//! ├── Resolution    - Namespace URI/index could not be resolved
//! ├── Unsupported   - Identifier type outside {numeric, string}
//! ├── NotFound      - Unknown client/subscription handle
//! ├── Subscription  - Invalid state transitions, limits, stream ownership
//! └── Configuration - Invalid address text or client settings
//! ```
//!
//! # Example
//!
//! ```
//! use ualink_core::{AddressResolver, NamespaceTable, NodeId};
//!
//! let table = NamespaceTable::build(["http://opcfoundation.org/UA/", "urn:plant"]);
//! let resolver = AddressResolver::new(&table);
//!
//! let wire = resolver.resolve(&"nsu=urn:plant;i=1001".parse::<NodeId>().unwrap()).unwrap();
//! assert_eq!(wire.to_string(), "ns=1;i=1001");
//!
//! let node = resolver.decode(wire).unwrap();
//! assert_eq!(node.namespace_uri(), Some("urn:plant"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod namespace;
pub mod resolver;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use error::{
    ConfigurationError, ErrorCode, ErrorSeverity, NotFoundError, ResolutionError,
    SubscriptionError, UaError, UaResult, UnsupportedError,
};

pub use namespace::{normalize_uri, NamespaceTable, OPCUA_NAMESPACE_URI};

pub use resolver::{AddressResolver, Resolve};

pub use types::{
    reference_types, Address, ExpandedNodeId, Identifier, NodeId, QualifiedName, RelativePath,
    RelativePathElement, WireIdentifier, WireNodeId, WireQualifiedName, WireRelativePathElement,
};

pub use value::{StatusCode, Variant};
