// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address types on both sides of the namespace table.
//!
//! Application-level addresses name their namespace by URI, by index, or both:
//!
//! - **Identifier**: numeric or string node identifier
//! - **NodeId** / **QualifiedName**: identifier or name plus optional namespace index and URI
//! - **ExpandedNodeId** / **Address**: what the application asks to resolve
//! - **RelativePathElement**: one step of a browse path
//!
//! Wire-level addresses carry only the session-scoped namespace index and
//! all four identifier kinds the protocol defines:
//!
//! - **WireNodeId** / **WireIdentifier**
//! - **WireQualifiedName**
//! - **WireRelativePathElement**
//!
//! # Examples
//!
//! ```
//! use ualink_core::types::{Identifier, NodeId, WireNodeId};
//!
//! let node: NodeId = "nsu=urn:plant;s=Line1.Pump".parse().unwrap();
//! assert_eq!(node.namespace_uri(), Some("urn:plant"));
//! assert_eq!(node.identifier(), &Identifier::string("Line1.Pump"));
//!
//! let wire: WireNodeId = "ns=2;i=1001".parse().unwrap();
//! assert_eq!(wire.namespace_index, 2);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, UaError, UnsupportedError};

// =============================================================================
// Identifier
// =============================================================================

/// Node identifier value as seen by applications.
///
/// Only numeric and string identifiers are modelled. Ordering compares the
/// variant first (`Numeric < String`), then the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Identifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),
}

impl Identifier {
    /// Creates a numeric identifier.
    #[inline]
    pub const fn numeric(value: u32) -> Self {
        Self::Numeric(value)
    }

    /// Creates a string identifier.
    #[inline]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Returns `true` if this is a numeric identifier.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Returns `true` if this is a string identifier.
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns the numeric value if this is a numeric identifier.
    #[inline]
    pub fn as_numeric(&self) -> Option<u32> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::String(_) => None,
        }
    }

    /// Returns the string value if this is a string identifier.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::String(v) => Some(v),
        }
    }

    /// Returns the identifier type name.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "Numeric",
            Self::String(_) => "String",
        }
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::Numeric(_) => 0,
            Self::String(_) => 1,
        }
    }

    /// Total order: variant tag first, then value.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }

    /// Converts to the wire identifier.
    pub fn to_wire(&self) -> WireIdentifier {
        match self {
            Self::Numeric(v) => WireIdentifier::Numeric(*v),
            Self::String(v) => WireIdentifier::String(v.clone()),
        }
    }

    fn parse_text(input: &str, text: &str) -> Result<Self, UaError> {
        if let Some(id) = text.strip_prefix("i=") {
            let value = id.parse::<u32>().map_err(|_| {
                UaError::configuration(ConfigurationError::invalid_node_id(
                    input,
                    "Invalid numeric identifier",
                ))
            })?;
            Ok(Self::Numeric(value))
        } else if let Some(id) = text.strip_prefix("s=") {
            Ok(Self::String(id.to_string()))
        } else if text.starts_with("g=") {
            Err(UaError::unsupported(UnsupportedError::identifier_type("Guid")))
        } else if text.starts_with("b=") {
            Err(UaError::unsupported(UnsupportedError::identifier_type("Opaque")))
        } else {
            Err(UaError::configuration(ConfigurationError::invalid_node_id(
                input,
                "Unknown identifier type. Expected i= or s=",
            )))
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
        }
    }
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// =============================================================================
// Namespace ordering helper
// =============================================================================

/// Compares two optional values with absent sorting before present.
#[inline]
fn compare_optional<T: Ord + ?Sized>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// Writes the `ns=..;nsu=..;` prefix shared by the application text forms.
fn write_namespace_prefix(
    f: &mut fmt::Formatter<'_>,
    index: Option<u16>,
    uri: Option<&str>,
) -> fmt::Result {
    match (index, uri) {
        (Some(index), Some(uri)) => write!(f, "ns={};nsu={};", index, uri),
        (Some(index), None) => write!(f, "ns={};", index),
        (None, Some(uri)) => write!(f, "nsu={};", uri),
        (None, None) => write!(f, "ns=?;"),
    }
}

/// Splits the `ns=..;nsu=..;` prefix off an application text form.
///
/// `make_error` builds the error for an unparsable namespace index.
fn split_namespace_prefix<'a>(
    text: &'a str,
    make_error: impl Fn(&str) -> UaError,
) -> Result<(Option<u16>, Option<String>, &'a str), UaError> {
    let mut rest = text;
    let mut index = None;
    let mut uri = None;

    if let Some(after) = rest.strip_prefix("ns=") {
        let (ns, tail) = after
            .split_once(';')
            .ok_or_else(|| make_error("Missing identifier after namespace"))?;
        if ns != "?" {
            index = Some(
                ns.parse::<u16>()
                    .map_err(|_| make_error("Invalid namespace index"))?,
            );
        }
        rest = tail;
    }

    if let Some(after) = rest.strip_prefix("nsu=") {
        let (u, tail) = after
            .split_once(';')
            .ok_or_else(|| make_error("Missing identifier after namespace URI"))?;
        if u.is_empty() {
            return Err(make_error("Empty namespace URI"));
        }
        uri = Some(u.to_string());
        rest = tail;
    }

    Ok((index, uri, rest))
}

// =============================================================================
// NodeId
// =============================================================================

/// Application-level node identifier.
///
/// The namespace is given by URI, by index, or both. A URI survives
/// reconnects; an index is only meaningful for the session that assigned
/// it. A NodeId with neither cannot be resolved.
///
/// # Examples
///
/// ```
/// use ualink_core::types::{Identifier, NodeId};
///
/// let by_uri = NodeId::with_uri("urn:plant", Identifier::numeric(5));
/// let by_index = NodeId::numeric(2, 5);
///
/// assert_eq!(by_uri.to_string(), "nsu=urn:plant;i=5");
/// assert_eq!(by_index.to_string(), "ns=2;i=5");
///
/// // an absent namespace index sorts first
/// assert!(by_uri < by_index);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    identifier: Identifier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_index: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_uri: Option<String>,
}

impl NodeId {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a NodeId qualified by namespace index.
    #[inline]
    pub fn with_index(namespace_index: u16, identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            namespace_index: Some(namespace_index),
            namespace_uri: None,
        }
    }

    /// Creates a NodeId qualified by namespace URI.
    #[inline]
    pub fn with_uri(namespace_uri: impl Into<String>, identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            namespace_index: None,
            namespace_uri: Some(namespace_uri.into()),
        }
    }

    /// Creates a NodeId carrying both namespace index and URI.
    #[inline]
    pub fn with_index_and_uri(
        namespace_index: u16,
        namespace_uri: impl Into<String>,
        identifier: impl Into<Identifier>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            namespace_index: Some(namespace_index),
            namespace_uri: Some(namespace_uri.into()),
        }
    }

    /// Creates a NodeId without any namespace information.
    #[inline]
    pub fn unqualified(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            namespace_index: None,
            namespace_uri: None,
        }
    }

    /// Creates a numeric NodeId qualified by namespace index.
    #[inline]
    pub const fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            identifier: Identifier::Numeric(value),
            namespace_index: Some(namespace_index),
            namespace_uri: None,
        }
    }

    /// Creates a string NodeId qualified by namespace index.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self::with_index(namespace_index, Identifier::String(value.into()))
    }

    /// Returns a copy with the namespace URI set.
    pub fn and_uri(mut self, namespace_uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(namespace_uri.into());
        self
    }

    /// Returns a copy with the namespace index set.
    pub fn and_index(mut self, namespace_index: u16) -> Self {
        self.namespace_index = Some(namespace_index);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the identifier.
    #[inline]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Returns the namespace index, if known.
    #[inline]
    pub fn namespace_index(&self) -> Option<u16> {
        self.namespace_index
    }

    /// Returns the namespace URI, if known.
    #[inline]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// Returns `true` if neither namespace index nor URI is set.
    #[inline]
    pub fn is_unqualified(&self) -> bool {
        self.namespace_index.is_none() && self.namespace_uri.is_none()
    }

    /// Structural order over (identifier, namespace index, namespace URI).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.identifier
            .compare(&other.identifier)
            .then_with(|| compare_optional(self.namespace_index.as_ref(), other.namespace_index.as_ref()))
            .then_with(|| compare_optional(self.namespace_uri.as_deref(), other.namespace_uri.as_deref()))
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_namespace_prefix(f, self.namespace_index, self.namespace_uri.as_deref())?;
        write!(f, "{}", self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = UaError;

    /// Parses a NodeId from its text form.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001`
    /// - `nsu=urn:plant;s=Pump`
    /// - `ns=2;nsu=urn:plant;s=Pump`
    /// - `ns=?;s=Pump` or `s=Pump` (no namespace)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (namespace_index, namespace_uri, rest) = split_namespace_prefix(input, |reason| {
            UaError::configuration(ConfigurationError::invalid_node_id(input, reason))
        })?;
        let identifier = Identifier::parse_text(input, rest)?;

        Ok(Self {
            identifier,
            namespace_index,
            namespace_uri,
        })
    }
}

// =============================================================================
// QualifiedName
// =============================================================================

/// Application-level qualified name, used as browse path targets.
///
/// Resolves with the same precedence as [`NodeId`]. Ordering compares the
/// name, then the namespace index, then the namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_index: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_uri: Option<String>,
}

impl QualifiedName {
    /// Creates a qualified name in a namespace given by index.
    pub fn with_index(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace_index: Some(namespace_index),
            namespace_uri: None,
        }
    }

    /// Creates a qualified name in a namespace given by URI.
    pub fn with_uri(namespace_uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace_index: None,
            namespace_uri: Some(namespace_uri.into()),
        }
    }

    /// Creates a qualified name without namespace information.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace_index: None,
            namespace_uri: None,
        }
    }

    /// Creates a qualified name in the standard namespace (index 0).
    pub fn standard(name: impl Into<String>) -> Self {
        Self::with_index(0, name)
    }

    /// Returns a copy with the namespace URI set.
    pub fn and_uri(mut self, namespace_uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(namespace_uri.into());
        self
    }

    /// Returns the name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace index, if known.
    #[inline]
    pub fn namespace_index(&self) -> Option<u16> {
        self.namespace_index
    }

    /// Returns the namespace URI, if known.
    #[inline]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// Order over (name, namespace index, namespace URI).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| compare_optional(self.namespace_index.as_ref(), other.namespace_index.as_ref()))
            .then_with(|| compare_optional(self.namespace_uri.as_deref(), other.namespace_uri.as_deref()))
    }
}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_namespace_prefix(f, self.namespace_index, self.namespace_uri.as_deref())?;
        write!(f, "{}", self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = UaError;

    /// Parses a qualified name.
    ///
    /// Supported formats:
    /// - `2:Temperature` (namespace index)
    /// - `nsu=urn:plant;Temperature`, `ns=2;nsu=urn:plant;Temperature`
    /// - `Temperature` (no namespace)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        if input.starts_with("ns=") || input.starts_with("nsu=") {
            let (namespace_index, namespace_uri, name) =
                split_namespace_prefix(input, |reason| {
                    UaError::configuration(ConfigurationError::invalid_qualified_name(
                        input, reason,
                    ))
                })?;
            return Ok(Self {
                name: name.to_string(),
                namespace_index,
                namespace_uri,
            });
        }

        if let Some((ns, name)) = input.split_once(':') {
            if let Ok(index) = ns.parse::<u16>() {
                return Ok(Self::with_index(index, name));
            }
        }

        if input.is_empty() {
            return Err(UaError::configuration(
                ConfigurationError::invalid_qualified_name(input, "Empty name"),
            ));
        }

        Ok(Self::unqualified(input))
    }
}

// =============================================================================
// ExpandedNodeId
// =============================================================================

/// NodeId optionally qualified by the server it lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    /// The node within the server.
    pub node_id: NodeId,

    /// Server URI, for nodes on another server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_uri: Option<String>,

    /// Server index (0 = local server).
    #[serde(default)]
    pub server_index: u32,
}

impl ExpandedNodeId {
    /// Wraps a local NodeId.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            server_uri: None,
            server_index: 0,
        }
    }

    /// Sets the server index.
    pub fn with_server_index(mut self, server_index: u32) -> Self {
        self.server_index = server_index;
        self
    }

    /// Sets the server URI.
    pub fn with_server_uri(mut self, server_uri: impl Into<String>) -> Self {
        self.server_uri = Some(server_uri.into());
        self
    }

    /// Returns `true` if the node lives on the local server.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.server_index == 0 && self.server_uri.is_none()
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        Self::new(node_id)
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        write!(f, "{}", self.node_id)
    }
}

// =============================================================================
// RelativePathElement
// =============================================================================

/// One step of a browse path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativePathElement {
    /// Browse name of the target node.
    pub target_name: QualifiedName,

    /// Reference type to follow.
    pub reference_type: NodeId,

    /// Whether subtypes of the reference type also match.
    #[serde(default = "default_true")]
    pub include_subtypes: bool,

    /// Whether to follow the reference in inverse direction.
    #[serde(default)]
    pub is_inverse: bool,
}

fn default_true() -> bool {
    true
}

impl RelativePathElement {
    /// Creates a forward element including subtypes.
    pub fn new(target_name: QualifiedName, reference_type: NodeId) -> Self {
        Self {
            target_name,
            reference_type,
            include_subtypes: true,
            is_inverse: false,
        }
    }

    /// Creates an element following hierarchical references.
    pub fn hierarchical(target_name: QualifiedName) -> Self {
        Self::new(target_name, reference_types::HIERARCHICAL_REFERENCES)
    }

    /// Sets whether subtypes of the reference type match.
    pub fn with_include_subtypes(mut self, include: bool) -> Self {
        self.include_subtypes = include;
        self
    }

    /// Sets the direction.
    pub fn with_inverse(mut self, is_inverse: bool) -> Self {
        self.is_inverse = is_inverse;
        self
    }
}

impl fmt::Display for RelativePathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.is_inverse { '<' } else { '>' };
        write!(f, "{}[{}]{}", arrow, self.reference_type, self.target_name)
    }
}

// =============================================================================
// Address
// =============================================================================

/// A browse path from a starting node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativePath {
    /// Node the path starts at.
    pub start: ExpandedNodeId,

    /// Steps to follow.
    pub elements: Vec<RelativePathElement>,
}

impl RelativePath {
    /// Creates a relative path.
    pub fn new(start: impl Into<ExpandedNodeId>, elements: Vec<RelativePathElement>) -> Self {
        Self {
            start: start.into(),
            elements,
        }
    }
}

/// Something the application wants to read or monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Address {
    /// Direct node address.
    ExpandedNodeId(ExpandedNodeId),

    /// Browse path that has to be translated by the server first.
    RelativePath(RelativePath),
}

impl Address {
    /// Returns the NodeId if it can be extracted without browsing.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::ExpandedNodeId(expanded) => Some(&expanded.node_id),
            Self::RelativePath(_) => None,
        }
    }
}

impl From<NodeId> for Address {
    fn from(node_id: NodeId) -> Self {
        Self::ExpandedNodeId(ExpandedNodeId::new(node_id))
    }
}

impl From<ExpandedNodeId> for Address {
    fn from(expanded: ExpandedNodeId) -> Self {
        Self::ExpandedNodeId(expanded)
    }
}

impl From<RelativePath> for Address {
    fn from(path: RelativePath) -> Self {
        Self::RelativePath(path)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpandedNodeId(expanded) => write!(f, "{}", expanded),
            Self::RelativePath(path) => {
                write!(f, "{}", path.start)?;
                for element in &path.elements {
                    write!(f, "{}", element)?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Standard Nodes
// =============================================================================

/// The NamespaceArray variable of the server object (ns=0, i=2255).
pub const NAMESPACE_ARRAY: NodeId = NodeId::numeric(0, 2255);

/// Objects folder node (ns=0, i=85).
pub const OBJECTS_FOLDER: NodeId = NodeId::numeric(0, 85);

/// Standard reference type NodeIds.
pub mod reference_types {
    use super::NodeId;

    /// References (abstract base type) - i=31.
    pub const REFERENCES: NodeId = NodeId::numeric(0, 31);

    /// HierarchicalReferences (abstract) - i=33.
    pub const HIERARCHICAL_REFERENCES: NodeId = NodeId::numeric(0, 33);

    /// HasChild (abstract) - i=34.
    pub const HAS_CHILD: NodeId = NodeId::numeric(0, 34);

    /// Organizes - i=35.
    pub const ORGANIZES: NodeId = NodeId::numeric(0, 35);

    /// HasComponent - i=47.
    pub const HAS_COMPONENT: NodeId = NodeId::numeric(0, 47);

    /// HasProperty - i=46.
    pub const HAS_PROPERTY: NodeId = NodeId::numeric(0, 46);

    /// HasTypeDefinition - i=40.
    pub const HAS_TYPE_DEFINITION: NodeId = NodeId::numeric(0, 40);
}

// =============================================================================
// WireIdentifier
// =============================================================================

/// Node identifier as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum WireIdentifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),

    /// GUID identifier.
    Guid(Uuid),

    /// Opaque identifier (byte string).
    Opaque(Vec<u8>),
}

impl WireIdentifier {
    /// Returns the identifier type name.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "Numeric",
            Self::String(_) => "String",
            Self::Guid(_) => "Guid",
            Self::Opaque(_) => "Opaque",
        }
    }

    /// Returns the identifier type prefix of the text form.
    pub const fn type_prefix(&self) -> char {
        match self {
            Self::Numeric(_) => 'i',
            Self::String(_) => 's',
            Self::Guid(_) => 'g',
            Self::Opaque(_) => 'b',
        }
    }
}

impl TryFrom<WireIdentifier> for Identifier {
    type Error = UnsupportedError;

    fn try_from(value: WireIdentifier) -> Result<Self, Self::Error> {
        match value {
            WireIdentifier::Numeric(v) => Ok(Identifier::Numeric(v)),
            WireIdentifier::String(v) => Ok(Identifier::String(v)),
            other => Err(UnsupportedError::identifier_type(other.type_name())),
        }
    }
}

impl From<Identifier> for WireIdentifier {
    fn from(value: Identifier) -> Self {
        match value {
            Identifier::Numeric(v) => Self::Numeric(v),
            Identifier::String(v) => Self::String(v),
        }
    }
}

impl fmt::Display for WireIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// WireNodeId
// =============================================================================

/// Node identifier as carried on the wire: session-scoped namespace index
/// plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireNodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: WireIdentifier,
}

impl WireNodeId {
    /// Creates a wire NodeId.
    #[inline]
    pub fn new(namespace_index: u16, identifier: impl Into<WireIdentifier>) -> Self {
        Self {
            namespace_index,
            identifier: identifier.into(),
        }
    }

    /// Creates a numeric wire NodeId.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self::new(namespace_index, WireIdentifier::Numeric(value))
    }

    /// Creates a string wire NodeId.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self::new(namespace_index, WireIdentifier::String(value.into()))
    }

    /// Returns `true` if this is the null NodeId (ns=0, i=0).
    #[inline]
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && matches!(self.identifier, WireIdentifier::Numeric(0))
    }
}

impl fmt::Display for WireNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl FromStr for WireNodeId {
    type Err = UaError;

    /// Parses a wire NodeId.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=1001` (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason: String| {
            UaError::configuration(ConfigurationError::invalid_node_id(input, reason))
        };

        let (namespace_index, identifier_part) = match input.strip_prefix("ns=") {
            Some(after) => {
                let (ns, rest) = after
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace".to_string()))?;
                let ns = ns
                    .parse::<u16>()
                    .map_err(|_| invalid("Invalid namespace index".to_string()))?;
                (ns, rest)
            }
            None => (0, input),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            WireIdentifier::Numeric(
                id.parse()
                    .map_err(|_| invalid("Invalid numeric identifier".to_string()))?,
            )
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            WireIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            WireIdentifier::Guid(
                Uuid::parse_str(id).map_err(|e| invalid(format!("Invalid GUID: {}", e)))?,
            )
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            WireIdentifier::Opaque(
                BASE64
                    .decode(id)
                    .map_err(|e| invalid(format!("Invalid base64: {}", e)))?,
            )
        } else {
            return Err(invalid(
                "Unknown identifier type. Expected i=, s=, g=, or b=".to_string(),
            ));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// WireQualifiedName / WireRelativePathElement
// =============================================================================

/// Qualified name as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireQualifiedName {
    /// Namespace index.
    pub namespace_index: u16,

    /// The name string.
    pub name: String,
}

impl WireQualifiedName {
    /// Creates a wire qualified name.
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }
}

impl fmt::Display for WireQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace_index, self.name)
        }
    }
}

/// Browse path step as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireRelativePathElement {
    /// Reference type to follow.
    pub reference_type_id: WireNodeId,

    /// Whether to follow the reference in inverse direction.
    pub is_inverse: bool,

    /// Whether subtypes of the reference type also match.
    pub include_subtypes: bool,

    /// Browse name of the target node.
    pub target_name: WireQualifiedName,
}

// =============================================================================
// Tests
// =============================================================================
