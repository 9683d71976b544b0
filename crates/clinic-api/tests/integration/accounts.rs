//! Registration, login and access control.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_health_is_public() {
    let harness = TestHarness::new().await;
    let (status, body) = harness.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_register_then_login() {
    let harness = TestHarness::new().await;
    let (id, token) = harness.register_user("maria@clinic.ph").await;
    assert!(!token.is_empty());

    let (status, body) = harness
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "Maria@Clinic.ph", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["birthday"], "1994-06-12");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let harness = TestHarness::new().await;
    harness.register_user("dup@clinic.ph").await;
    let (status, body) = harness
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "fullName": "Other",
                "email": "dup@clinic.ph",
                "password": "password123",
                "phone": "1",
                "address": "x",
                "birthday": "2000-01-01",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "conflict");
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let harness = TestHarness::new().await;
    let (status, body) = harness
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "fullName": "Short",
                "email": "short@clinic.ph",
                "password": "1234567",
                "phone": "1",
                "address": "x",
                "birthday": "2000-01-01",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "password");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let harness = TestHarness::new().await;
    harness.register_user("ana@clinic.ph").await;
    let (status, body) = harness
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "ana@clinic.ph", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let harness = TestHarness::new().await;
    let (status, body) = harness.send(Method::GET, "/doctors", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["category"], "authentication");

    let (status, _) = harness.get("/doctors", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_auth_passes_through() {
    let harness = TestHarness::with_auth(false).await;
    let (status, body) = harness.send(Method::GET, "/doctors", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_patient_cannot_edit_another_patient() {
    let harness = TestHarness::new().await;
    let (_, first) = harness.register_user("first@clinic.ph").await;
    let (second_id, _) = harness.register_user("second@clinic.ph").await;

    let (status, body) = harness
        .put(
            &format!("/user/{second_id}"),
            &first,
            json!({ "address": "Elsewhere" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["category"], "authorization");
}

#[tokio::test]
async fn test_partial_profile_update_keeps_other_fields() {
    let harness = TestHarness::new().await;
    let (id, token) = harness.register_user("keep@clinic.ph").await;

    let (status, body) = harness
        .put(&format!("/user/{id}"), &token, json!({ "address": "Purok 7" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["address"], "Purok 7");
    assert_eq!(body["phone"], "09171234567");
    assert_eq!(body["name"], "Maria Santos");
}

#[tokio::test]
async fn test_doctor_profile_and_directory() {
    let harness = TestHarness::new().await;
    let (doctor, token) = harness.register_doctor("reyes@clinic.ph").await;

    let (status, body) = harness.get(&format!("/doctor/profile/{doctor}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["specialty_name"], "Obstetrics");
    assert_eq!(body["status"], "active");

    // No live schedules yet, so the directory recomputes the doctor as inactive.
    let (status, body) = harness.get("/doctors", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "inactive");
    assert_eq!(body[0]["active_schedule_count"], 0);
}

#[tokio::test]
async fn test_doctors_offering_a_purpose() {
    let harness = TestHarness::new().await;
    let (reyes, token) = harness.register_doctor("reyes@clinic.ph").await;
    harness.register_doctor("lim@clinic.ph").await;
    let admin = harness.admin_token().await;

    let (_, profile) = harness.get(&format!("/doctor/profile/{reyes}"), &token).await;
    let (status, purpose) = harness
        .post(
            "/purposes",
            &admin,
            json!({
                "specialty_id": profile["specialization_id"],
                "purpose_name": "Prenatal",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{purpose}");

    let (status, body) = harness
        .get(&format!("/doctors/purpose/{}", purpose["id"]), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let doctors = body.as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["doctor_id"], reyes);
    assert_eq!(doctors[0]["specialty_name"], "Obstetrics");

    let (status, body) = harness.get("/doctors/purpose/99999", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_admin_profile_update_rehashes_password() {
    let harness = TestHarness::new().await;
    let (id, admin) = harness.admin_login().await;
    let (status, me) = harness.get(&format!("/admin/profile/{id}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@example.com");

    let (status, _) = harness
        .put(
            &format!("/admin/profile/{id}"),
            &admin,
            json!({ "password": "new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = harness
        .send(
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "email": "admin@example.com", "password": "new-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
