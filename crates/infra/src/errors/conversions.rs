//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use reqwest::Error as HttpError;
use storedesk_domain::RpcError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RpcError);

impl From<InfraError> for RpcError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RpcError> for InfraError {
    fn from(value: RpcError) -> Self {
        InfraError(value)
    }
}

trait IntoRpcError {
    fn into_rpc(self) -> RpcError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RpcError */
/* -------------------------------------------------------------------------- */

impl IntoRpcError for HttpError {
    fn into_rpc(self) -> RpcError {
        if self.is_timeout() {
            return RpcError::connection("HTTP request timed out");
        }

        if self.is_connect() {
            return RpcError::connection(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return RpcError::config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_decode() {
            return RpcError::server(format!("invalid response envelope: {self}"), None);
        }

        if let Some(status) = self.status() {
            return RpcError::from_http_response(status.as_u16(), "");
        }

        RpcError::connection(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rpc())
    }
}

/// Map a failure where no HTTP response arrived to a connection error.
///
/// Never consults a status code: without a response there is nothing to
/// classify.
pub fn connection_error(err: &HttpError, timeout: Duration) -> RpcError {
    if err.is_timeout() {
        RpcError::connection(format!("HTTP request timed out after {}s", timeout.as_secs()))
    } else if err.is_connect() {
        RpcError::connection(format!("HTTP connection failure: {err}"))
    } else {
        RpcError::connection(format!("HTTP request failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use serde_json::Value;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn http_status_401_maps_to_auth_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: RpcError = InfraError::from(error).into();
            match mapped {
                RpcError::Authentication { status, .. } => assert_eq!(status, Some(401)),
                other => panic!("expected authentication error, got {other:?}"),
            }
        });
    }

    #[test]
    fn undecodable_body_maps_to_server_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error = client.get(server.uri()).send().await.unwrap().json::<Value>().await;

            let mapped: RpcError = InfraError::from(error.unwrap_err()).into();
            assert!(matches!(mapped, RpcError::Server { .. }), "{mapped:?}");
        });
    }

    #[test]
    fn timeout_maps_to_connection_error_with_budget() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
                .mount(&server)
                .await;

            let timeout = Duration::from_millis(50);
            let client = Client::builder().no_proxy().build().unwrap();
            let error = client.get(server.uri()).timeout(timeout).send().await.unwrap_err();

            match connection_error(&error, Duration::from_secs(10)) {
                RpcError::Connection { message } => assert!(message.contains("10s"), "{message}"),
                other => panic!("expected connection error, got {other:?}"),
            }
        });
    }
}
