//! HTTP transport tests against a local mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mobius_trader_client::transport::http::basic_auth;
use mobius_trader_client::*;

fn transport_for(server: &MockServer) -> HttpTransport {
    let config = ClientConfig::new("127.0.0.1", 1, 7, "secret");
    HttpTransport::new(&config)
        .unwrap()
        .with_endpoint(format!("{}/", server.uri()))
}

#[tokio::test]
async fn test_request_sends_auth_and_returns_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", basic_auth(7, "secret").as_str()))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "AccountGet",
            "params": {"Id": 5}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": "x", "result": {"Id": 5}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = transport_for(&server)
        .request("AccountGet", json!({"Id": 5}))
        .await
        .unwrap();
    assert_eq!(result, json!({"Id": 5}));
}

#[tokio::test]
async fn test_error_payload_becomes_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "x",
            "error": {"code": -32602, "message": "Invalid params", "data": {"field": "Id"}}
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .request("AccountGet", json!({}))
        .await
        .unwrap_err();
    match err {
        ClientError::Server(e) => {
            assert_eq!(e.code, -32602);
            assert_eq!(e.data, Some(json!({"field": "Id"})));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .request("SymbolsGet", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(ref m) if m.contains("500")));
}

#[tokio::test]
async fn test_failed_status_with_json_body_is_transport_error() {
    for (status, body) in [
        (401, json!({"message": "Unauthorized"})),
        (502, json!(null)),
        (500, json!({"jsonrpc": "2.0", "id": "x", "result": 1})),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .request("SymbolsGet", json!({}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Transport(ref m) if m.contains(&status.to_string())),
            "status {status}: got {err:?}"
        );
    }
}

#[tokio::test]
async fn test_failed_status_with_rpc_error_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "x",
            "error": {"code": -32004, "message": "Access denied"}
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .request("AccountGet", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server(ref e) if e.code == -32004));
}

#[tokio::test]
async fn test_connect_loads_metadata_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "SymbolsGet"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "x",
            "result": [{"Id": 1, "Name": "EURUSD", "FractionalDigits": 5, "MarginCurrencyId": 10}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "CurrenciesGet"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "x",
            "result": [{"Id": 10, "Name": "USD", "VolumeFractionalDigits": 2, "DepositFractionalDigits": 2}]
        })))
        .mount(&server)
        .await;

    let address = server.address();
    let config = ClientConfig::new(address.ip().to_string(), address.port(), 7, "secret");
    let mut registry: ClientRegistry = ClientRegistry::new();
    let client = registry.get_or_connect(config).await.unwrap();

    assert_eq!(client.symbol("EURUSD").unwrap().id, 1);
    assert_eq!(client.price_from_int(1_i64, 112345).unwrap(), 1.12345);
}

#[tokio::test]
async fn test_trader_auth_reads_jwt_or_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-jwt"))
        .and(body_partial_json(json!({"login": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jwt": "token-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get-jwt"))
        .and(body_partial_json(json!({"login": "mallory"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Invalid password"})))
        .mount(&server)
        .await;

    let mut config = ClientConfig::new("127.0.0.1", 1, 7, "secret");
    config.terminal_url = Some(server.uri());
    let client = MobiusTrader::with_transport(config.clone(), HttpTransport::new(&config).unwrap());

    let jwt = client
        .trader_auth("alice", "pw", "10.0.0.1", "test")
        .await
        .unwrap();
    assert_eq!(jwt, "token-1");

    let err = client
        .trader_auth("mallory", "bad", "10.0.0.1", "test")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Auth(ref m) if m == "Invalid password"));
}
