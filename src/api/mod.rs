//! HTTP JSON API.
//!
//! Handlers are thin: they identify the caller, check the permission the
//! operation needs in the addressed restaurant, and call into [`crate::core`].
//! Tenant routes live under `/api/restaurants/{restaurant_id}`.

pub mod error;
pub mod extract;
pub mod identity;

mod campaigns;
mod customers;
mod employees;
mod expenses;
mod inventory;
mod kds;
mod menu;
mod orders;
mod reports;
mod reservations;
mod restaurants;
mod tables;
mod temp_orders;

use crate::config::settings::AppConfig;
use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use identity::Caller;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    /// The shared database connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn tenant_routes() -> Router<AppState> {
    Router::new()
        .merge(tables::routes())
        .merge(menu::routes())
        .merge(inventory::routes())
        .merge(temp_orders::routes())
        .merge(orders::routes())
        .merge(kds::routes())
        .merge(customers::routes())
        .merge(campaigns::routes())
        .merge(reservations::routes())
        .merge(employees::routes())
        .merge(expenses::routes())
        .merge(reports::routes())
}

/// Builds the application router with its middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(restaurants::routes())
        .nest("/api/restaurants/{restaurant_id}", tenant_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    async fn app() -> Result<(Router, crate::entities::restaurant::Model)> {
        let (db, restaurant) = setup_with_restaurant().await?;
        create_test_employee(&db, restaurant.id, "chef", Role::Chef).await?;
        Ok((router(AppState::new(db, AppConfig::default())), restaurant))
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_state_clones_share_one_connection() -> Result<()> {
        let db = setup_test_db().await?;
        let state = AppState::new(db, AppConfig::default());
        let copy = state.clone();

        assert!(std::ptr::eq(state.db(), copy.db()));
        assert!(Arc::ptr_eq(&state.config, &copy.config));
        Ok(())
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (app, _) = app().await?;
        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_identity_and_permissions() -> Result<()> {
        let (app, restaurant) = app().await?;
        let uri = format!("/api/restaurants/{}/tables", restaurant.id);
        let table = json!({ "name": "T1", "capacity": 4 });

        let (status, body) = send(&app, request("POST", &uri, None, Some(table.clone()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let (status, _) = send(&app, request("POST", &uri, Some("chef"), Some(table.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, request("POST", &uri, Some(TEST_OWNER), Some(table.clone()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "T1");

        let (status, body) = send(&app, request("POST", &uri, Some(TEST_OWNER), Some(table))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");

        let (status, body) = send(&app, request("GET", &uri, Some("chef"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_flow_over_http() -> Result<()> {
        let (app, restaurant) = app().await?;
        let base = format!("/api/restaurants/{}", restaurant.id);
        let owner = Some(TEST_OWNER);

        let (_, item) = send(
            &app,
            request(
                "POST",
                &format!("{base}/menu"),
                owner,
                Some(json!({ "name": "Masala Dosa", "category": "mains", "price": 6.5 })),
            ),
        )
        .await;
        let (status, draft) = send(
            &app,
            request(
                "POST",
                &format!("{base}/temp-orders"),
                owner,
                Some(json!({ "kind": "takeaway" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let draft_uri = format!("{base}/temp-orders/{}", draft["id"]);
        let (status, details) = send(
            &app,
            request(
                "POST",
                &format!("{draft_uri}/items"),
                owner,
                Some(json!({ "menu_item_id": item["id"], "quantity": 2 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["subtotal"], 13.0);

        let (status, order) = send(
            &app,
            request("POST", &format!("{draft_uri}/checkout"), owner, Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["serial_number"], 1);

        let (status, tickets) = send(&app, request("GET", &format!("{base}/kds"), Some("chef"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tickets[0]["items"][0]["accepted"], Value::Null);

        let order_uri = format!("{base}/orders/{}", order["id"]);
        let (status, body) = send(
            &app,
            request(
                "POST",
                &format!("{order_uri}/pay"),
                owner,
                Some(json!({ "pay_mode": "loyalty_points" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");

        let (status, paid) = send(
            &app,
            request("POST", &format!("{order_uri}/pay"), owner, Some(json!({ "pay_mode": "upi" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["is_paid"], true);

        let (status, body) = send(
            &app,
            request(
                "PUT",
                &format!("{order_uri}/discount"),
                owner,
                Some(json!({ "type": "percentage", "percent": 10.0 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "order_locked");

        let (status, report) = send(
            &app,
            request("GET", &format!("{base}/reports/daily-sales"), owner, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["revenue"], 13.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_input_uses_error_body() -> Result<()> {
        let (app, restaurant) = app().await?;
        let base = format!("/api/restaurants/{}", restaurant.id);

        let (status, body) = send(
            &app,
            request("POST", &format!("{base}/tables"), Some(TEST_OWNER), Some(json!({ "name": "T9" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");

        let (status, body) = send(
            &app,
            request("GET", &format!("{base}/expenses?from=yesterday"), Some(TEST_OWNER), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");

        let (status, body) =
            send(&app, request("GET", "/api/restaurants/abc/menu", Some(TEST_OWNER), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_failed");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_restaurant_is_not_found() -> Result<()> {
        let (app, _) = app().await?;
        let (status, body) = send(
            &app,
            request("GET", "/api/restaurants/999/menu", Some(TEST_OWNER), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
        Ok(())
    }
}
