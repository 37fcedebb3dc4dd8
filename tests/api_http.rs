//! HTTP surface checks driven through the actix service: the bearer guard,
//! the auth round trip with profile auto-provisioning, and the payment
//! endpoint.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;

use florence::auth::{AuthResponse, AuthService, AuthUser};
use florence::db::Database;
use florence::models::{Bill, BillStatus, Patient, Role};
use florence::store::Store;
use florence::{api, error::ErrorBody};

const JWT_SECRET: &str = "test-only-secret";

macro_rules! test_app {
    () => {{
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        let store = web::Data::new(Store::new(&db));
        let auth = web::Data::new(AuthService::new(db.pool().clone(), JWT_SECRET.into(), 60));
        test::init_service(
            App::new()
                .app_data(store)
                .app_data(auth)
                .configure(api::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn requests_without_a_token_are_rejected() {
    let app = test_app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/patients").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/patients")
            .insert_header(("Authorization", "Bearer not-a-real-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn register_login_and_call_the_guarded_surface() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": "asha@clinic.test",
                "password": "correct-horse",
                "full_name": "Asha Verma",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({
                "email": "asha@clinic.test",
                "password": "correct-horse",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session: AuthResponse = test::read_body_json(resp).await;
    let bearer = ("Authorization", format!("Bearer {}", session.access_token));

    // First login auto-created the profile with the default role.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(bearer.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: AuthUser = test::read_body_json(resp).await;
    assert_eq!(me.email, "asha@clinic.test");
    assert_eq!(me.role, Role::Doctor);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/patients")
            .insert_header(bearer.clone())
            .set_json(json!({
                "name": "Anand Rao",
                "age": 58,
                "gender": "M",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Patient = test::read_body_json(resp).await;
    assert_eq!(created.name, "Anand Rao");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/patients")
            .insert_header(bearer)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Patient> = test::read_body_json(resp).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[actix_web::test]
async fn the_payment_endpoint_settles_a_bill() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": "billing@clinic.test",
                "password": "correct-horse",
                "full_name": "Billing Desk",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({
                "email": "billing@clinic.test",
                "password": "correct-horse",
            }))
            .to_request(),
    )
    .await;
    let session: AuthResponse = test::read_body_json(resp).await;
    let bearer = ("Authorization", format!("Bearer {}", session.access_token));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/bills")
            .insert_header(bearer.clone())
            .set_json(json!({
                "patient_id": uuid::Uuid::new_v4(),
                "date": "2026-08-04",
                "subtotal": 1000.0,
                "discount": 0.0,
                "total_amount": 1000.0,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bill: Bill = test::read_body_json(resp).await;
    assert_eq!(bill.status, BillStatus::Unpaid);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/bills/{}/payments", bill.id))
            .insert_header(bearer.clone())
            .set_json(json!({ "amount": 400.0, "payment_method": "Cash" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let partly: Bill = test::read_body_json(resp).await;
    assert_eq!(partly.paid_amount, 400.0);
    assert_eq!(partly.status, BillStatus::PartiallyPaid);

    // An overpayment maps to 400 with the validation kind on the wire.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/bills/{}/payments", bill.id))
            .insert_header(bearer)
            .set_json(json!({ "amount": 700.0, "payment_method": "Cash" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.kind, florence::error::ErrorKind::Validation);
}
