// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session-scoped namespace table.
//!
//! The server publishes its namespaces as an ordered list of URIs; the
//! position of a URI in that list is its namespace index for the current
//! session. A [`NamespaceTable`] maps both ways between the two and is
//! rebuilt from scratch whenever the list is received again.
//!
//! URIs are stored and looked up in normalized form (see [`normalize_uri`]).
//!
//! # Examples
//!
//! ```
//! use ualink_core::namespace::NamespaceTable;
//!
//! let table = NamespaceTable::build(["http://opcfoundation.org/UA/", "urn:Plant:Line1/"]);
//!
//! assert_eq!(table.lookup_uri(1), Some("urn:plant:line1"));
//! assert_eq!(table.lookup_index("URN:PLANT:LINE1"), Some(1));
//! assert_eq!(table.lookup_index("urn:other"), None);
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::{ResolutionError, UaResult};
use crate::value::{StatusCode, Variant};

/// URI of the OPC UA standard namespace (always index 0).
pub const OPCUA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

/// Normalizes a namespace URI for comparison.
///
/// Lower-cases the whole string, then strips exactly one trailing `/`.
///
/// ```
/// use ualink_core::namespace::normalize_uri;
///
/// assert_eq!(normalize_uri("HTTP://Example.com/"), "http://example.com");
/// assert_eq!(normalize_uri(""), "");
/// ```
pub fn normalize_uri(uri: &str) -> String {
    let mut normalized = uri.to_lowercase();
    if normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

// =============================================================================
// NamespaceTable
// =============================================================================

/// Bidirectional mapping between namespace index and normalized URI.
///
/// Immutable once built. When the same normalized URI appears more than
/// once, [`lookup_index`](Self::lookup_index) returns the lowest index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    uris: Vec<String>,
    indices: HashMap<String, u16>,
}

impl NamespaceTable {
    /// Builds a table from the server's ordered namespace list.
    ///
    /// Never fails. Entries beyond index `u16::MAX` are ignored.
    pub fn build<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        let mut ignored = 0usize;

        for uri in uris {
            let Ok(index) = u16::try_from(table.uris.len()) else {
                ignored += 1;
                continue;
            };
            let normalized = normalize_uri(uri.as_ref());
            table.indices.entry(normalized.clone()).or_insert(index);
            table.uris.push(normalized);
        }

        if ignored > 0 {
            tracing::warn!(ignored, "Namespace array exceeds the index range");
        }

        table
    }

    /// Builds a table from the result of reading the NamespaceArray node.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NamespaceArrayUnavailable`] if the status is
    /// not good or the value is not an array of strings.
    pub fn from_data_value(status: StatusCode, value: &Variant) -> UaResult<Self> {
        if !status.is_good() {
            return Err(ResolutionError::namespace_array_unavailable(
                status.bits(),
                format!("read returned {}", status),
            )
            .into());
        }

        let uris = value.as_string_array().ok_or_else(|| {
            ResolutionError::namespace_array_unavailable(
                status.bits(),
                format!("expected a string array, got {}", value.type_name()),
            )
        })?;

        Ok(Self::build(uris))
    }

    /// Returns the normalized URI for a namespace index.
    #[inline]
    pub fn lookup_uri(&self, index: u16) -> Option<&str> {
        self.uris.get(usize::from(index)).map(String::as_str)
    }

    /// Returns the lowest namespace index whose URI matches `uri` after
    /// normalization.
    pub fn lookup_index(&self, uri: &str) -> Option<u16> {
        self.indices.get(&normalize_uri(uri)).copied()
    }

    /// Returns the number of namespaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Returns `true` if the table has no namespaces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Iterates over `(index, normalized uri)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> + '_ {
        self.uris
            .iter()
            .enumerate()
            .map_while(|(i, uri)| Some((u16::try_from(i).ok()?, uri.as_str())))
    }
}

impl fmt::Display for NamespaceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, uri) in self.iter() {
            writeln!(f, " {}: {}", index, uri)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
