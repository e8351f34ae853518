//! Shared fixtures: an in-process stand-in for the catalog service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::Router;
use serde_json::{json, Value};

use crate::models::ClothingItem;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Wraps `router` so every request it receives is counted.
pub(crate) fn counted(router: Router) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = router.layer(middleware::from_fn(move |req: Request, next: Next| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(req).await
        }
    }));
    (router, hits)
}

/// A base URL nothing is listening on.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub(crate) fn item_json(id: i64, category: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "owner_id": 1,
        "name": null,
        "original_url": format!("/static/{}_orig.jpg", id),
        "processed_url": format!("/static/{}_proc.png", id),
        "category": category,
        "color": null,
        "created_at": created_at,
        "photos": []
    })
}

pub(crate) fn item(id: i64, category: &str, created_at: &str) -> ClothingItem {
    serde_json::from_value(item_json(id, category, created_at)).unwrap()
}
