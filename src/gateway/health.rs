/// Handler for GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = String, example = json!("ok"))
    ),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "ok"
}
