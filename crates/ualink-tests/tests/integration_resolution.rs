// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address resolution integration tests.
//!
//! - Namespace table construction from server data
//! - URI and index based resolution
//! - Wire decoding round trips
//! - Namespace table replacement on reconnect

use ualink_core::types::{
    reference_types, Address, ExpandedNodeId, NodeId, RelativePath, WireIdentifier, WireNodeId,
    WireQualifiedName,
};
use ualink_core::value::{StatusCode, Variant};
use ualink_core::{AddressResolver, NamespaceTable, OPCUA_NAMESPACE_URI};
use ualink_tests::common::assertions::{ErrorAssertions, ResultAssertions};
use ualink_tests::common::builders::ConnectionBuilder;
use ualink_tests::common::fixtures::{AddressFixtures, NamespaceFixtures};
use ualink_tests::common::init_test_logging;

// =============================================================================
// Namespace Table
// =============================================================================

#[test]
fn test_table_from_namespace_array_read() {
    init_test_logging();

    let table =
        NamespaceTable::from_data_value(StatusCode::GOOD, &NamespaceFixtures::standard_value())
            .assert_ok();

    assert_eq!(table.len(), 4);
    assert_eq!(table.lookup_index(OPCUA_NAMESPACE_URI), Some(0));
    assert_eq!(table.lookup_index(NamespaceFixtures::PLANT_URI), Some(2));
    assert_eq!(table.lookup_uri(3), Some("http://vendor.example.com/ua"));
}

#[test]
fn test_table_lookup_ignores_case_and_trailing_slash() {
    init_test_logging();

    let table = NamespaceTable::build(NamespaceFixtures::unnormalized());
    let standard = NamespaceFixtures::standard_table();

    for (index, uri) in standard.iter() {
        assert_eq!(table.lookup_index(uri), Some(index), "uri: {uri}");
    }
    assert_eq!(table, standard);
}

#[test]
fn test_bad_namespace_array_read_is_rejected() {
    init_test_logging();

    let err = NamespaceTable::from_data_value(
        StatusCode::BAD_NOT_READABLE,
        &NamespaceFixtures::standard_value(),
    )
    .assert_err();
    err.assert_code("UA-0105");
    err.assert_retryable(true);

    let err = NamespaceTable::from_data_value(StatusCode::GOOD, &Variant::Int32(3)).assert_err();
    err.assert_category("resolution");
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_resolve_by_uri_and_by_index() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    let by_uri = resolver.resolve(&AddressFixtures::pump_speed()).assert_ok();
    let by_index = resolver
        .resolve(&AddressFixtures::pump_speed_by_index())
        .assert_ok();

    assert_eq!(by_uri, WireNodeId::string(2, "Pump1.Speed"));
    assert_eq!(by_uri, by_index);
    assert_eq!(
        resolver.resolve(&AddressFixtures::vendor_counter()).assert_ok(),
        WireNodeId::numeric(3, 1001)
    );
}

#[test]
fn test_single_namespace_end_to_end() {
    init_test_logging();

    let table = NamespaceTable::build(["urn:x"]);
    let resolver = AddressResolver::new(&table);

    assert_eq!(
        resolver.resolve(&NodeId::with_uri("urn:x", "n1")).assert_ok(),
        WireNodeId::string(0, "n1")
    );
    resolver
        .resolve(&NodeId::with_uri("urn:y", "n1"))
        .assert_err()
        .assert_category("resolution");
}

#[test]
fn test_uri_takes_precedence_over_index() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    let node = NodeId::with_index_and_uri(3, NamespaceFixtures::PLANT_URI, "Pump1.Speed");
    assert_eq!(
        resolver.resolve(&node).assert_ok().namespace_index,
        NamespaceFixtures::plant_index()
    );
}

#[test]
fn test_unknown_namespace_is_reported() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    let err = resolver
        .resolve(&AddressFixtures::unknown_namespace())
        .assert_err();
    err.assert_code("UA-0101");
    assert!(err.to_string().contains("urn:nowhere"));

    let err = resolver
        .resolve(&NodeId::unqualified("Orphan"))
        .assert_err();
    err.assert_code("UA-0103");
    err.assert_retryable(false);
}

#[test]
fn test_resolve_path_element_and_address() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    let element = resolver
        .resolve(&AddressFixtures::pump_path_element())
        .assert_ok();
    assert_eq!(element.target_name, WireQualifiedName::new(2, "Pump1"));
    assert_eq!(element.reference_type_id, WireNodeId::numeric(0, 33));
    assert!(element.include_subtypes);
    assert!(!element.is_inverse);

    let direct = Address::from(ExpandedNodeId::new(AddressFixtures::pump_speed()));
    assert_eq!(
        resolver.resolve(&direct).assert_ok(),
        WireNodeId::string(2, "Pump1.Speed")
    );

    let path = Address::from(RelativePath::new(
        ualink_core::types::OBJECTS_FOLDER,
        vec![AddressFixtures::pump_path_element()],
    ));
    resolver.resolve(&path).assert_err().assert_code("UA-0104");
}

#[test]
fn test_hierarchical_reference_constant() {
    assert_eq!(reference_types::HIERARCHICAL_REFERENCES.namespace_index(), Some(0));
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_resolve_then_decode_round_trip() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    let wire = resolver.resolve(&AddressFixtures::pump_speed()).assert_ok();
    let decoded = resolver.decode(wire).assert_ok();

    assert_eq!(
        decoded,
        NodeId::with_index_and_uri(2, NamespaceFixtures::PLANT_URI, "Pump1.Speed")
    );
    assert_eq!(decoded.to_string(), "ns=2;nsu=urn:sylvex:plant;s=Pump1.Speed");
}

#[test]
fn test_decode_checks_namespace_before_identifier_type() {
    init_test_logging();

    let table = NamespaceFixtures::standard_table();
    let resolver = AddressResolver::new(&table);

    for identifier in [
        WireIdentifier::Opaque(vec![1, 2, 3]),
        WireIdentifier::Numeric(1),
    ] {
        resolver
            .decode_node_id(99, identifier)
            .assert_err()
            .assert_code("UA-0102");
    }

    resolver
        .decode_node_id(2, WireIdentifier::Opaque(vec![1, 2, 3]))
        .assert_err()
        .assert_category("unsupported");
}

// =============================================================================
// Reconnect
// =============================================================================

#[test]
fn test_reconnect_with_reordered_namespaces() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().build();
    let connection = &fixture.connection;
    let address = AddressFixtures::pump_speed();

    let before = connection.resolve_address(&address).assert_ok();
    assert_eq!(before.namespace_index, 2);

    let previous = connection.namespace_table();
    connection.on_namespace_array_received(NamespaceFixtures::reordered());

    let after = connection.resolve_address(&address).assert_ok();
    assert_eq!(after.namespace_index, 3);

    // A snapshot taken before the swap keeps resolving against the old table.
    let old = AddressResolver::new(&previous).resolve(&address).assert_ok();
    assert_eq!(old.namespace_index, 2);
}

#[test]
fn test_failed_namespace_read_keeps_current_table() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().build();
    let connection = &fixture.connection;

    connection
        .on_namespace_array_read(StatusCode::BAD_COMMUNICATION_ERROR, &Variant::Empty)
        .assert_err()
        .assert_category("resolution");

    assert_eq!(*connection.namespace_table(), NamespaceFixtures::standard_table());
    assert_eq!(
        connection
            .decode_wire_node_id(2, WireIdentifier::String("Pump1.Speed".into()))
            .assert_ok()
            .namespace_uri(),
        Some(NamespaceFixtures::PLANT_URI)
    );
}
