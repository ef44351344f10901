//! HTTP-level tests for the `/api` surface: envelope shape, status codes,
//! verbs, and the statistics endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_user, TestClient};
use ecocusco_db::DbPool;
use serde_json::json;

/// Without a session cookie the API answers 401 with the envelope.
#[sqlx::test(migrations = "../db/migrations")]
async fn api_requires_authentication(pool: DbPool) {
    let mut client = TestClient::new(pool);
    let response = client.get("/api/reportes").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

/// Create -> list -> show -> update -> delete through the JSON surface.
#[sqlx::test(migrations = "../db/migrations")]
async fn api_crud_round_trip(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;

    // Create: 201 with the stored row.
    let response = client
        .send_json(
            Method::POST,
            "/api/reportes",
            json!({
                "tipo_material": "vidrio",
                "cantidad": 3.5,
                "ubicacion": "San Blas",
                "urgencia": 2
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().expect("created id");
    assert_eq!(body["data"]["estado"], "pendiente");

    // List: paginated envelope containing the new row.
    let response = client.get("/api/reportes").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["ubicacion"], "San Blas");
    // The page metadata matches the repository contract.
    assert_eq!(body["data"]["last_page"], 1);
    assert_eq!(body["data"]["has_more"], false);

    // Show.
    let response = client.get(&format!("/api/reportes/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Update via PUT.
    let response = client
        .send_json(
            Method::PUT,
            &format!("/api/reportes/{id}"),
            json!({
                "tipo_material": "vidrio",
                "cantidad": 5.0,
                "ubicacion": "San Blas",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["cantidad"], 5.0);

    // Delete via DELETE.
    let response = client
        .send_json(Method::DELETE, &format!("/api/reportes/{id}"), json!(null))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(&format!("/api/reportes/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Invalid payloads return 400 with the field->messages map.
#[sqlx::test(migrations = "../db/migrations")]
async fn api_create_returns_field_errors(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;

    let response = client
        .send_json(
            Method::POST,
            "/api/reportes",
            json!({ "tipo_material": "uranio", "cantidad": -1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["errors"]["tipo_material"].is_array());
    assert!(body["errors"]["ubicacion"].is_array());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reportes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

/// Foreign reports answer 403; unknown ids answer 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn api_enforces_ownership(pool: DbPool) {
    let mut ana = TestClient::new(pool.clone());
    register_user(&mut ana, "Ana", "ana@x.com").await;
    let response = ana
        .send_json(
            Method::POST,
            "/api/reportes",
            json!({ "tipo_material": "papel", "cantidad": 1.0, "ubicacion": "Plaza Mayor" }),
        )
        .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let mut beto = TestClient::new(pool.clone());
    register_user(&mut beto, "Beto", "beto@x.com").await;

    let response = beto.get(&format!("/api/reportes/{id}")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = beto
        .send_json(Method::DELETE, &format!("/api/reportes/{id}"), json!(null))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = beto.get("/api/reportes/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// The statistics endpoints aggregate across users.
#[sqlx::test(migrations = "../db/migrations")]
async fn api_statistics_aggregate(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;
    for (tipo, cantidad) in [("plastico", 2.0), ("plastico", 3.0), ("vidrio", 1.0)] {
        let response = client
            .send_json(
                Method::POST,
                "/api/reportes",
                json!({ "tipo_material": tipo, "cantidad": cantidad, "ubicacion": "Plaza Mayor" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client.get("/api/estadisticas/datos").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totales"]["total_reportes"], 3);
    assert_eq!(body["data"]["totales"]["total_kilos"], 6.0);

    let response = client.get("/api/estadisticas/graficos").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let labels = body["data"]["materiales"]["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    // Heaviest material first.
    assert_eq!(labels[0], "plastico");
    assert_eq!(body["data"]["materiales"]["kilos"][0], 5.0);
}
