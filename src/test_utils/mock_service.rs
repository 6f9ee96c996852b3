//! Mock build/match service: records every POSTed JSON body and answers
//! with a canned response.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::Value;

struct ServiceState {
    status: u16,
    body: Value,
    requests: Mutex<Vec<Value>>,
}

pub struct ServiceServer {
    addr: SocketAddr,
    state: Arc<ServiceState>,
}

impl ServiceServer {
    /// Endpoint URL to hand to a client under test.
    pub fn endpoint(&self) -> String {
        format!("http://{}/endpoint", self.addr)
    }

    /// Every JSON body received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

/// Serves `body` with status 200 for every POST.
pub async fn json_server(body: Value) -> ServiceServer {
    json_server_with_status(200, body).await
}

/// Serves `body` with the given status for every POST.
pub async fn json_server_with_status(status: u16, body: Value) -> ServiceServer {
    let state = Arc::new(ServiceState {
        status,
        body,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handler).with_state(Arc::clone(&state));
    let addr = super::spawn(app).await;
    ServiceServer { addr, state }
}

async fn handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(request);
    (
        StatusCode::from_u16(state.status).unwrap(),
        Json(state.body.clone()),
    )
}
