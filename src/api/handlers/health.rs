use crate::api::envelope::Reply;
use crate::utils::error::Result;
use serde_json::json;

pub async fn health() -> Result<Reply> {
    Reply::ok(
        "Service is healthy",
        &json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}),
    )
}
