//! Shared helpers for the end-to-end suites: builder pairs wired over the
//! in-memory transport, plus a hand-rolled wire peer for tests that need
//! to observe or forge raw frames.

#![allow(dead_code)]

use bytes::Bytes;
use serde_json::{Value, json};

use embermcp::prelude::*;
use embermcp::protocol::jsonrpc;
use embermcp::{JsonRpcMessage, PROTOCOL_VERSION};

/// Connect a client and server builder over an in-memory pair and drive
/// both handshakes to completion.
pub async fn connect_pair(
    client: SessionBuilder,
    server: SessionBuilder,
) -> (Session, Session) {
    let (client_end, server_end) = InMemoryTransport::pair();
    let server_task = tokio::spawn(server.connect(server_end));
    let client_session = client.connect(client_end).await.expect("client connect");
    let server_session = server_task
        .await
        .expect("server connect task")
        .expect("server connect");
    (client_session, server_session)
}

/// Plain builders for tests that only care about the plumbing.
pub fn plain_client() -> SessionBuilder {
    SessionBuilder::client(Implementation::new("test-client", "0.1.0"))
}

pub fn plain_server() -> SessionBuilder {
    SessionBuilder::server(Implementation::new("test-server", "0.1.0"))
}

/// Read and parse the next frame from a raw transport end.
pub async fn recv_message(raw: &InMemoryTransport) -> JsonRpcMessage {
    let bytes = raw
        .recv()
        .await
        .expect("raw recv")
        .expect("stream still open");
    jsonrpc::parse_message(&bytes).expect("well-formed frame")
}

/// Serialize and send a JSON value as one frame on a raw transport end.
pub async fn send_json(raw: &InMemoryTransport, value: Value) {
    let bytes = serde_json::to_vec(&value).expect("encode frame");
    raw.send(Bytes::from(bytes)).await.expect("raw send");
}

/// Answer a client session's handshake by hand: consume `initialize`,
/// reply with `version`, consume `notifications/initialized`.
pub async fn raw_server_handshake(raw: &InMemoryTransport, version: &str) {
    let message = recv_message(raw).await;
    let JsonRpcMessage::Request(request) = message else {
        panic!("expected initialize request, got {message:?}");
    };
    assert_eq!(request.method, "initialize");
    send_json(
        raw,
        json!({
            "jsonrpc": "2.0",
            "id": serde_json::to_value(&request.id).expect("encode id"),
            "result": {
                "protocolVersion": version,
                "capabilities": {},
                "serverInfo": { "name": "raw-server", "version": "0.0.1" }
            }
        }),
    )
    .await;
    if version == PROTOCOL_VERSION {
        let message = recv_message(raw).await;
        let JsonRpcMessage::Notification(notification) = message else {
            panic!("expected initialized notification, got {message:?}");
        };
        assert_eq!(notification.method, "notifications/initialized");
    }
}

/// Drive a server session's handshake by hand from the client side.
pub async fn raw_client_handshake(raw: &InMemoryTransport) {
    send_json(
        raw,
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "raw-client", "version": "0.0.1" }
            }
        }),
    )
    .await;
    let message = recv_message(raw).await;
    let JsonRpcMessage::Response(response) = message else {
        panic!("expected initialize response, got {message:?}");
    };
    assert!(response.is_success(), "initialize failed: {response:?}");
    send_json(
        raw,
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
}
