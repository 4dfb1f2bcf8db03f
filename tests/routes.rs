use actix_web::{App, test, web};
use jsonwebtoken::{EncodingKey, Header, encode};

use accord_crm::auth::AuthenticatedUser;
use accord_crm::models::config::ServerConfig;
use accord_crm::routes;

mod common;

use common::{TestDb, mediator_user};

const SECRET: &str = "test-secret";

fn server_config(database_url: &str) -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 0,
        database_url: database_url.to_string(),
        secret: SECRET.to_string(),
        auth_service_url: "https://auth.example".to_string(),
        processor_secret_key: "sk_test_123".to_string(),
        processor_webhook_secret: "whsec_123".to_string(),
        price_standard: "price_standard".to_string(),
        price_premium: "price_premium".to_string(),
        invoice_due_days: 14,
    }
}

fn token(user: &AuthenticatedUser) -> String {
    encode(
        &Header::default(),
        user,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

#[actix_web::test]
async fn health_reports_ok() {
    let db = TestDb::new("routes_health.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.repo()))
            .app_data(web::Data::new(server_config("unused")))
            .service(routes::main::health),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn requests_without_token_are_rejected() {
    let db = TestDb::new("routes_noauth.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.repo()))
            .app_data(web::Data::new(server_config("unused")))
            .service(web::scope("/api/v1").service(routes::clients::list_clients)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/clients").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn garbage_token_is_rejected() {
    let db = TestDb::new("routes_badtoken.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.repo()))
            .app_data(web::Data::new(server_config("unused")))
            .service(web::scope("/api/v1").service(routes::clients::list_clients)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/clients")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn mediator_can_register_and_list_clients() {
    let db = TestDb::new("routes_clients.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.repo()))
            .app_data(web::Data::new(server_config("unused")))
            .service(
                web::scope("/api/v1")
                    .service(routes::clients::register_client)
                    .service(routes::clients::list_clients),
            ),
    )
    .await;

    let user = mediator_user("jane@example.com");
    let auth = format!("Bearer {}", token(&user));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/clients")
            .insert_header(("Authorization", auth.clone()))
            .set_json(serde_json::json!({
                "email": "alice@example.com",
                "name": "Alice",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/clients")
            .insert_header(("Authorization", auth))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn clients_cannot_register_clients() {
    let db = TestDb::new("routes_forbidden.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.repo()))
            .app_data(web::Data::new(server_config("unused")))
            .service(web::scope("/api/v1").service(routes::clients::register_client)),
    )
    .await;

    let user = common::client_user("bob@example.com");
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/clients")
            .insert_header(("Authorization", format!("Bearer {}", token(&user))))
            .set_json(serde_json::json!({
                "email": "alice@example.com",
                "name": "Alice",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
}
