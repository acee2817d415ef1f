// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Conversion between application addresses and wire identifiers.
//!
//! Resolution applies a fixed precedence:
//!
//! 1. Namespace URI present: look up its index in the table.
//! 2. Otherwise namespace index present: use it as given.
//! 3. Otherwise: [`ResolutionError::NoNamespace`].
//!
//! Decoding goes the other way and attaches both the index and the URI,
//! so the result stays meaningful after a reconnect.
//!
//! # Examples
//!
//! ```
//! use ualink_core::namespace::NamespaceTable;
//! use ualink_core::resolver::AddressResolver;
//! use ualink_core::types::{NodeId, WireNodeId};
//!
//! let table = NamespaceTable::build(["urn:x"]);
//! let resolver = AddressResolver::new(&table);
//!
//! let wire = resolver.resolve(&NodeId::with_uri("urn:x", "n1")).unwrap();
//! assert_eq!(wire, WireNodeId::string(0, "n1"));
//! ```

use crate::error::{ResolutionError, UaError, UaResult, UnsupportedError};
use crate::namespace::{normalize_uri, NamespaceTable};
use crate::types::{
    Address, Identifier, NodeId, QualifiedName, RelativePathElement, WireIdentifier, WireNodeId,
    WireQualifiedName, WireRelativePathElement,
};

// =============================================================================
// Resolve trait
// =============================================================================

/// An application address that can be turned into its wire form.
pub trait Resolve {
    /// The wire form.
    type Output;

    /// Resolves against the resolver's namespace table.
    fn resolve_with(&self, resolver: &AddressResolver<'_>) -> UaResult<Self::Output>;
}

impl Resolve for NodeId {
    type Output = WireNodeId;

    fn resolve_with(&self, resolver: &AddressResolver<'_>) -> UaResult<WireNodeId> {
        resolver.resolve_node_id(self)
    }
}

impl Resolve for QualifiedName {
    type Output = WireQualifiedName;

    fn resolve_with(&self, resolver: &AddressResolver<'_>) -> UaResult<WireQualifiedName> {
        resolver.resolve_qualified_name(self)
    }
}

impl Resolve for RelativePathElement {
    type Output = WireRelativePathElement;

    fn resolve_with(&self, resolver: &AddressResolver<'_>) -> UaResult<WireRelativePathElement> {
        resolver.resolve_relative_path_element(self)
    }
}

impl Resolve for Address {
    type Output = WireNodeId;

    fn resolve_with(&self, resolver: &AddressResolver<'_>) -> UaResult<WireNodeId> {
        resolver.resolve_address(self)
    }
}

// =============================================================================
// AddressResolver
// =============================================================================

/// Resolves addresses against a borrowed [`NamespaceTable`].
#[derive(Debug, Clone, Copy)]
pub struct AddressResolver<'a> {
    table: &'a NamespaceTable,
}

impl<'a> AddressResolver<'a> {
    /// Creates a resolver over a namespace table.
    #[inline]
    pub fn new(table: &'a NamespaceTable) -> Self {
        Self { table }
    }

    /// Returns the namespace table.
    #[inline]
    pub fn table(&self) -> &'a NamespaceTable {
        self.table
    }

    /// Resolves any supported address type.
    pub fn resolve<T: Resolve + ?Sized>(&self, target: &T) -> UaResult<T::Output> {
        target.resolve_with(self)
    }

    /// Picks the wire namespace index for an address.
    fn namespace_index(
        &self,
        index: Option<u16>,
        uri: Option<&str>,
        target: &dyn std::fmt::Display,
    ) -> Result<u16, ResolutionError> {
        if let Some(uri) = uri {
            return self.table.lookup_index(uri).ok_or_else(|| {
                ResolutionError::unknown_namespace_uri(normalize_uri(uri), target.to_string())
            });
        }
        index.ok_or_else(|| ResolutionError::no_namespace(target.to_string()))
    }

    /// Resolves a NodeId to its wire form.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::UnknownNamespaceUri`] if the URI is not in the table
    /// - [`ResolutionError::NoNamespace`] if neither URI nor index is set
    pub fn resolve_node_id(&self, node_id: &NodeId) -> UaResult<WireNodeId> {
        let namespace_index =
            self.namespace_index(node_id.namespace_index(), node_id.namespace_uri(), node_id)?;

        Ok(WireNodeId::new(namespace_index, node_id.identifier().to_wire()))
    }

    /// Resolves a qualified name to its wire form.
    pub fn resolve_qualified_name(&self, name: &QualifiedName) -> UaResult<WireQualifiedName> {
        let namespace_index =
            self.namespace_index(name.namespace_index(), name.namespace_uri(), name)?;

        Ok(WireQualifiedName::new(namespace_index, name.name()))
    }

    /// Resolves a relative path element.
    ///
    /// The target name is resolved first; if it fails the reference type is
    /// not looked at.
    pub fn resolve_relative_path_element(
        &self,
        element: &RelativePathElement,
    ) -> UaResult<WireRelativePathElement> {
        let target_name = self.resolve_qualified_name(&element.target_name)?;
        let reference_type_id = self.resolve_node_id(&element.reference_type)?;

        Ok(WireRelativePathElement {
            reference_type_id,
            is_inverse: element.is_inverse,
            include_subtypes: element.include_subtypes,
            target_name,
        })
    }

    /// Resolves an address that carries a NodeId.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::CannotExtractNodeId`] for relative path addresses,
    /// otherwise the errors of [`resolve_node_id`](Self::resolve_node_id).
    pub fn resolve_address(&self, address: &Address) -> UaResult<WireNodeId> {
        let node_id = address
            .node_id()
            .ok_or_else(|| ResolutionError::cannot_extract_node_id(address.to_string()))?;
        self.resolve_node_id(node_id)
    }

    /// Decodes a wire NodeId into an application NodeId carrying both the
    /// namespace index and its URI.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::UnknownNamespaceIndex`] if the index is not in the table
    /// - [`UnsupportedError::IdentifierType`] for GUID and opaque identifiers
    ///
    /// The namespace index is checked first.
    pub fn decode_node_id(
        &self,
        namespace_index: u16,
        identifier: WireIdentifier,
    ) -> UaResult<NodeId> {
        let uri = self
            .table
            .lookup_uri(namespace_index)
            .ok_or_else(|| ResolutionError::unknown_namespace_index(namespace_index))?;
        let identifier = Identifier::try_from(identifier).map_err(UaError::unsupported)?;

        Ok(NodeId::with_index_and_uri(namespace_index, uri, identifier))
    }

    /// Decodes a [`WireNodeId`].
    #[inline]
    pub fn decode(&self, wire: WireNodeId) -> UaResult<NodeId> {
        self.decode_node_id(wire.namespace_index, wire.identifier)
    }

    /// Decodes a wire qualified name.
    pub fn decode_qualified_name(&self, name: &WireQualifiedName) -> UaResult<QualifiedName> {
        let uri = self
            .table
            .lookup_uri(name.namespace_index)
            .ok_or_else(|| ResolutionError::unknown_namespace_index(name.namespace_index))?;

        Ok(QualifiedName::with_index(name.namespace_index, name.name.clone()).and_uri(uri))
    }
}

// =============================================================================
// Tests
// =============================================================================
