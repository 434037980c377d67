//! HTTP trigger endpoint in the function host's custom-handler format.
//!
//! The handler answers with the `Outputs` / `ReturnValue` / `Logs` envelope.
//! The status follows the outcome: 200 when the service accepted the
//! raindrop, 502 when it refused or could not be reached, 500 when the
//! blocking task itself died.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::Nimbus;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: BTreeMap<String, Value>,
    pub return_value: Value,
    pub logs: Vec<String>,
}

impl InvokeResponse {
    fn new(output: String, logs: Vec<String>) -> Self {
        Self {
            outputs: BTreeMap::from([("output".to_string(), Value::String(output))]),
            return_value: Value::String(String::new()),
            logs,
        }
    }
}

pub fn router(nimbus: Arc<Nimbus>) -> Router {
    Router::new()
        .route("/trigger", get(trigger).post(trigger))
        .with_state(nimbus)
}

pub async fn serve(listener: TcpListener, nimbus: Arc<Nimbus>) -> Result<(), std::io::Error> {
    axum::serve(listener, router(nimbus)).await
}

async fn trigger(State(nimbus): State<Arc<Nimbus>>) -> (StatusCode, Json<InvokeResponse>) {
    let outcome = tokio::task::spawn_blocking(move || nimbus.run_example()).await;

    let (status, response) = match outcome {
        Ok(Ok(outcome)) if outcome.is_success() => {
            info!(status = outcome.status, "trigger succeeded");
            let logs = vec![format!("raindrop created (HTTP {})", outcome.status)];
            (StatusCode::OK, InvokeResponse::new(outcome.body, logs))
        }
        Ok(Ok(outcome)) => {
            warn!(status = outcome.status, "raindrop service refused the request");
            let logs = vec![format!("raindrop service answered HTTP {}", outcome.status)];
            (StatusCode::BAD_GATEWAY, InvokeResponse::new(outcome.body, logs))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "raindrop request failed");
            (StatusCode::BAD_GATEWAY, InvokeResponse::new(String::new(), vec![e.to_string()]))
        }
        Err(e) => {
            error!(error = %e, "trigger task failed");
            let logs = vec![format!("trigger task failed: {e}")];
            (StatusCode::INTERNAL_SERVER_ERROR, InvokeResponse::new(String::new(), logs))
        }
    };
    (status, Json(response))
}
