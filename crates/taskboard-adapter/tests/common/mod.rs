/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskboard-adapter tests

use taskboard_adapter::{ClientConfig, TaskboardClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server root
pub fn client_for(server: &MockServer) -> TaskboardClient {
    TaskboardClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// JSON body of a task as the server returns it
pub fn task_json(id: &str, title: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": "Medium",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}
