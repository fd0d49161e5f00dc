//! Static greeting endpoint. Has no dependencies and cannot fail.

use axum::Json;
use serde::Serialize;

use crate::config::HELLO_MESSAGE;

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: HELLO_MESSAGE,
    })
}
