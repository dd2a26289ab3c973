use std::path::Path;

use axum::{
    response::IntoResponse,
    routing::{delete, get, get_service, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL, LOCATION};
use http::StatusCode;
use sqlx::SqlitePool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod routes;

use routes::{activities, health};

pub const LANDING_PAGE: &str = "/static/index.html";

async fn root_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, LANDING_PAGE)])
}

/// Builds the full application: API routes, landing redirect and `/static`.
pub fn app(pool: SqlitePool, static_dir: impl AsRef<Path>) -> Router {
    let api_routes = Router::new()
        .route("/activities", get(activities::list_activities_handler))
        .route(
            "/activities/:activity_name/signup",
            post(activities::signup_handler),
        )
        .route(
            "/activities/:activity_name/unregister",
            delete(activities::unregister_handler),
        )
        .route("/health", get(health::health_handler))
        // Rosters change on every signup; never let a browser serve a stale list.
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(root_redirect))
        .merge(api_routes)
        .nest_service(
            "/static",
            get_service(ServeDir::new(static_dir.as_ref())),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::database;
    use crate::error::ErrorBody;

    async fn error_detail(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice::<ErrorBody>(&bytes).unwrap().detail
    }

    #[tokio::test]
    async fn root_redirects_to_landing_page() {
        let pool = database::open("sqlite::memory:", 1).await.unwrap();
        let response = app(pool, "static")
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], LANDING_PAGE);
    }

    #[tokio::test]
    async fn health_reports_ok_on_live_store() {
        let pool = database::open("sqlite::memory:", 1).await.unwrap();
        let response = app(pool, "static")
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn closed_store_answers_500_with_generic_detail() {
        let pool = database::open("sqlite::memory:", 1).await.unwrap();
        let router = app(pool.clone(), "static");
        pool.close().await;

        for uri in ["/health", "/activities"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(error_detail(response).await, "Internal Server Error");
        }
    }
}
