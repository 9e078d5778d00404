use ai_connectors::DynHttpTransport;
use ai_connectors::http::reqwest::default_dyn_transport;
use wiremock::MockServer;

/// Real reqwest transport pointed at a fresh mock server.
pub async fn server_and_transport() -> (MockServer, DynHttpTransport) {
    let server = MockServer::start().await;
    let transport = default_dyn_transport().expect("reqwest transport");
    (server, transport)
}
