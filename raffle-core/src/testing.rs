//! Local HTTP servers standing in for the indexer and the wallet.

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// JSON-RPC endpoint answering each method through `respond`, which returns
/// either a result or an `(code, message)` error.
pub async fn serve_rpc<F>(respond: F) -> String
where
    F: Fn(&str) -> Result<Value, (i64, String)> + Clone + Send + Sync + 'static,
{
    let router = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| {
            let respond = respond.clone();
            async move {
                let id = request["id"].clone();
                let method = request["method"].as_str().unwrap_or_default();
                let body = match respond(method) {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                    Err((code, message)) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": code, "message": message }
                    }),
                };
                Json(body)
            }
        }),
    );
    serve(router).await
}
