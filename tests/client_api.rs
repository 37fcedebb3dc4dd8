//! Client behavior against a mock backend: bearer handling, the 401
//! sign-out path, session lifecycle, and the shared collection semantics.

use chrono::Utc;
use uuid::Uuid;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use florence::auth::{AuthResponse, AuthUser};
use florence::client::{ApiClient, Bills, CredentialStore, Patients, Session, Workspace};
use florence::error::{ErrorBody, ErrorKind};
use florence::models::{
    Bill, BillStatus, Patient, PatientInsert, PatientUpdate, Payment, Role,
};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), CredentialStore::in_memory())
}

fn sample_patient(name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        age: 35,
        gender: "M".to_string(),
        contact: None,
        email: None,
        abha_id: None,
        address: None,
        photo_url: None,
        created_at: Utc::now(),
    }
}

fn sample_user() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: "asha@clinic.test".to_string(),
        full_name: "Asha Verma".to_string(),
        role: Role::Doctor,
        phone: None,
        department: None,
    }
}

fn auth_response(token: &str) -> AuthResponse {
    AuthResponse {
        access_token: token.to_string(),
        user: sample_user(),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

#[tokio::test]
async fn bearer_credential_rides_on_every_call() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    client.credentials().set("tok-1");

    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Patient>::new()))
        .expect(1)
        .mount(&server)
        .await;

    let rows: Vec<Patient> = client.get("/patients", &[]).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn unauthorized_clears_the_credential_and_later_calls_are_anonymous() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    client.credentials().set("stale-token");

    // The credentialed call is rejected; the follow-up must carry no bearer.
    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Patient>::new()))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get::<Vec<Patient>>("/patients", &[]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert!(client.credentials().token().is_none());

    let rows: Vec<Patient> = client.get("/patients", &[]).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn sign_in_stores_the_credential_and_sign_out_discards_it() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let session = Session::new(client.clone());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("fresh-token")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "Signed out" })),
        )
        .mount(&server)
        .await;

    let user = session.sign_in("asha@clinic.test", "hunter2hunter2").await.unwrap();
    assert_eq!(user.email, "asha@clinic.test");
    assert_eq!(client.credentials().token().as_deref(), Some("fresh-token"));
    assert!(session.is_signed_in());

    session.sign_out().await;
    assert!(client.credentials().token().is_none());
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn malformed_sign_in_never_reaches_the_network() {
    let server = MockServer::start().await;
    let session = Session::new(client_for(&server));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let err = session.sign_in("not-an-email", "").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.field_error("password").is_some());
}

#[tokio::test]
async fn restore_resumes_a_persisted_session() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    client.credentials().set("persisted-token");
    let session = Session::new(client.clone());

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer persisted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_user()))
        .mount(&server)
        .await;

    let restored = session.restore().await.unwrap();
    assert!(restored.is_some());
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn restore_with_a_rejected_credential_ends_signed_out() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    client.credentials().set("expired-token");
    let session = Session::new(client.clone());

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let restored = session.restore().await.unwrap();
    assert!(restored.is_none());
    assert!(client.credentials().token().is_none());
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn fetch_populates_clones_and_a_failed_refetch_keeps_the_items() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&client_for(&server));

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vec![sample_patient("Anand Rao")]),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_json(ErrorBody {
            kind: ErrorKind::Unknown,
            error: "backend unavailable".to_string(),
        }))
        .mount(&server)
        .await;

    // A list view and a modal observing the same collection agree.
    let list_view = workspace.patients.clone();
    let modal = workspace.patients.clone();

    list_view.fetch().await;
    assert_eq!(list_view.items().len(), 1);
    assert_eq!(modal.items().len(), 1);
    assert!(list_view.error().is_none());

    list_view.fetch().await;
    assert_eq!(modal.items().len(), 1, "failed refetch must not drop rows");
    assert_eq!(list_view.error().as_deref(), Some("backend unavailable"));
    assert!(!list_view.loading());
}

#[tokio::test]
async fn create_appends_after_acknowledgment_and_validation_issues_no_call() {
    let server = MockServer::start().await;
    let patients = Patients::new(client_for(&server));
    let acknowledged = sample_patient("Bela Shah");

    Mock::given(method("POST"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&acknowledged))
        .expect(1)
        .mount(&server)
        .await;

    let insert = PatientInsert {
        name: "Bela Shah".to_string(),
        age: 29,
        gender: "F".to_string(),
        contact: None,
        email: None,
        abha_id: None,
        address: None,
        photo_url: None,
    };
    let created = patients.create(insert.clone()).await.unwrap();
    assert_eq!(created.id, acknowledged.id);
    assert_eq!(patients.items()[0].id, acknowledged.id);

    // A blank required field fails locally; the expect(1) above verifies
    // the server saw exactly the one valid create.
    let err = patients
        .create(PatientInsert {
            name: String::new(),
            ..insert
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.field_error("name").as_deref(), Some("Name is required"));
    assert_eq!(patients.items().len(), 1);
    assert!(patients.error().is_some());
}

#[tokio::test]
async fn update_replaces_in_place_and_an_unknown_id_is_a_local_noop() {
    let server = MockServer::start().await;
    let patients = Patients::new(client_for(&server));
    let known = sample_patient("Meera Pillai");
    let stranger = sample_patient("Elsewhere Row");

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![known.clone()]))
        .mount(&server)
        .await;
    let renamed = Patient {
        name: "Meera Nair".to_string(),
        ..known.clone()
    };
    Mock::given(method("PATCH"))
        .and(path(format!("/patients/{}", known.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&renamed))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/patients/{}", stranger.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&stranger))
        .mount(&server)
        .await;

    patients.fetch().await;

    let patch = PatientUpdate {
        name: Some("Meera Nair".to_string()),
        ..Default::default()
    };
    patients.update(known.id, patch).await.unwrap();
    assert_eq!(patients.items()[0].name, "Meera Nair");

    // The acknowledged row is not in the local mirror, so nothing changes.
    patients.update(stranger.id, PatientUpdate::default()).await.unwrap();
    let items = patients.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, known.id);
}

#[tokio::test]
async fn delete_removes_the_row_from_the_local_mirror() {
    let server = MockServer::start().await;
    let patients = Patients::new(client_for(&server));
    let row = sample_patient("Arun Joshi");

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![row.clone()]))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/patients/{}", row.id)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    patients.fetch().await;
    assert_eq!(patients.items().len(), 1);

    patients.delete(row.id).await.unwrap();
    assert!(patients.items().is_empty());
}

#[tokio::test]
async fn recording_a_payment_goes_through_the_atomic_endpoint() {
    let server = MockServer::start().await;
    let bills = Bills::new(client_for(&server));
    let open_bill = Bill {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: None,
        appointment_id: None,
        date: "2026-08-04".parse().unwrap(),
        subtotal: 1000.0,
        discount: 0.0,
        total_amount: 1000.0,
        paid_amount: 0.0,
        status: BillStatus::Unpaid,
        items: Vec::new(),
        created_at: Utc::now(),
    };
    let settled = Bill {
        paid_amount: 1000.0,
        status: BillStatus::Paid,
        ..open_bill.clone()
    };

    Mock::given(method("GET"))
        .and(path("/bills"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![open_bill.clone()]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bills/{}/payments", open_bill.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&settled))
        .expect(1)
        .mount(&server)
        .await;

    bills.fetch().await;

    // A non-positive amount fails locally before any call goes out.
    let err = bills
        .record_payment(
            open_bill.id,
            Payment {
                amount: 0.0,
                payment_method: "Cash".to_string(),
                transaction_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let updated = bills
        .record_payment(
            open_bill.id,
            Payment {
                amount: 1000.0,
                payment_method: "Cash".to_string(),
                transaction_id: Some("TXN-77".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, BillStatus::Paid);
    assert_eq!(bills.items()[0].paid_amount, 1000.0);
}
