mod common;

use common::*;
use xenstore_client_core::{Client, ClientConfig, ErrorKind, XsError};

fn config() -> ClientConfig {
    ClientConfig::new().with_reader_fail_fast(true)
}

#[test]
fn read_of_a_missing_node_surfaces_server_error() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|request, _writer| {
        assert_eq!(request.message_type, OP_READ);
        Some((OP_ERROR, join_nul(&[b"ENOENT"])))
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), config()).expect("client init");

    let err = client.read("/local/domain/0/missing", 0).unwrap_err();
    match err {
        XsError::ServerError { kind } => assert_eq!(kind, ErrorKind::NoEntry),
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[test]
fn exists_treats_no_entry_as_false_not_as_an_error() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|_request, _writer| {
        Some((OP_ERROR, join_nul(&[b"ENOENT"])))
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), config()).expect("client init");

    assert!(!client.exists("/local/domain/0/missing", 0).unwrap());
}

#[test]
fn unknown_mnemonic_maps_to_invalid_argument_kind() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|_request, _writer| {
        Some((OP_ERROR, join_nul(&[b"EWEIRD"])))
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), config()).expect("client init");

    let err = client.read("/local/domain/0/x", 0).unwrap_err();
    match err {
        XsError::ServerError { kind } => assert_eq!(kind, ErrorKind::InvalidArgument),
        other => panic!("expected ServerError, got {other:?}"),
    }
}
