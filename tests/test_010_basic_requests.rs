mod common;

use common::*;
use xenstore_client_core::{Client, ClientConfig};

#[test]
fn read_returns_the_servers_reply_payload() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|request, _writer| {
        assert_eq!(request.message_type, OP_READ);
        assert_eq!(request.payload, join_nul(&[b"/local/domain/0/name"]));
        Some((OP_READ, b"my-domain".to_vec()))
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), ClientConfig::new().with_reader_fail_fast(true))
        .expect("client init");

    let value = client.read("/local/domain/0/name", 0).expect("read");
    assert_eq!(value, b"my-domain");
}

#[test]
fn write_then_directory_round_trip_through_the_mux() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|request, _writer| match request.message_type {
        OP_WRITE => Some((OP_WRITE, Vec::new())),
        OP_DIRECTORY => Some((OP_DIRECTORY, join_nul(&[b"name", b"domid"]))),
        other => panic!("unexpected request type {other}"),
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), ClientConfig::new().with_reader_fail_fast(true))
        .expect("client init");

    client.write("/local/domain/0/name", b"my-domain", 0).expect("write");
    let entries = client.directory("/local/domain/0", 0).expect("directory");
    assert_eq!(entries, vec!["name".to_string(), "domid".to_string()]);
}

#[test]
fn mkdir_and_rm_succeed_on_empty_reply() {
    let harness = new_harness();
    let (client_reader, client_writer, _server) = harness.spawn_responder(|request, _writer| match request.message_type {
        OP_MKDIR => Some((OP_MKDIR, Vec::new())),
        OP_RM => Some((OP_RM, Vec::new())),
        other => panic!("unexpected request type {other}"),
    });

    let client = Client::init(Box::new(client_reader), Box::new(client_writer), ClientConfig::new().with_reader_fail_fast(true))
        .expect("client init");

    client.mkdir("/local/domain/0/scratch", 0).expect("mkdir");
    client.rm("/local/domain/0/scratch", 0).expect("rm");
}
