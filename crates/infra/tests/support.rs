use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use storedesk_core::{RetryPolicy, StoredProcedureClient};
use storedesk_domain::{TenantContext, TimeoutTiers};
use storedesk_infra::HttpTransport;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-key";

/// Retry delay short enough to keep retrying tests fast.
pub const FAST_RETRY: Duration = Duration::from_millis(10);

/// Transport pointed at `server` with a fast three-retry policy.
pub fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::builder()
        .base_url(server.uri())
        .api_key(TEST_API_KEY)
        .retry_policy(RetryPolicy::new(3, FAST_RETRY))
        .build()
        .expect("http transport should build")
}

/// Transport with one-second tiers and no retries, for timeout tests.
pub fn impatient_transport_for(server: &MockServer) -> HttpTransport {
    let tiers = TimeoutTiers { short_secs: 1, default_secs: 1, long_running_secs: 1, upload_secs: 1 };
    HttpTransport::builder()
        .base_url(server.uri())
        .api_key(TEST_API_KEY)
        .timeouts(tiers)
        .retry_policy(RetryPolicy::none())
        .build()
        .expect("http transport should build")
}

pub fn test_tenant() -> TenantContext {
    TenantContext::default().with_store(1).with_user(7)
}

/// Client over a real HTTP transport.
pub fn client_for(server: &MockServer) -> StoredProcedureClient {
    StoredProcedureClient::new(Arc::new(transport_for(server)), test_tenant())
}

/// Wire envelope body.
pub fn envelope(status: i64, quantity: i64, data: Value) -> Value {
    json!({
        "statusCode": status,
        "message": "",
        "recordId": 0,
        "quantity": quantity,
        "data": data,
        "info1": null
    })
}

/// Address with nothing listening on it.
pub fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
