//! Catalog, announcements, intake records, statistics and CORS.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Datelike, Local};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{TestHarness, prenatal_booking};

#[tokio::test]
async fn test_catalog_writes_need_admin() {
    let harness = TestHarness::new().await;
    let (_, patient) = harness.register_user("ana@clinic.ph").await;
    let admin = harness.admin_token().await;

    let (status, _) = harness
        .post("/doctor-specialties", &patient, json!({ "specialty_name": "Pediatrics" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, specialty) = harness
        .post("/doctor-specialties", &admin, json!({ "specialty_name": "Pediatrics" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{specialty}");
    let specialty_id = specialty["id"].as_i64().unwrap();

    let (status, purpose) = harness
        .post(
            "/purposes",
            &admin,
            json!({ "specialty_id": specialty_id, "purpose_name": " Immunization " }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{purpose}");
    assert_eq!(purpose["purpose_name"], "Immunization");

    let (status, listed) = harness.get(&format!("/purposes/{specialty_id}"), &patient).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = harness
        .post("/purposes", &admin, json!({ "purpose_name": "Checkup" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], "validation");
}

#[tokio::test]
async fn test_blank_specialty_name_is_rejected() {
    let harness = TestHarness::new().await;
    let admin = harness.admin_token().await;
    let (status, body) = harness
        .post("/doctor-specialties", &admin, json!({ "specialty_name": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "specialty_name");
}

#[tokio::test]
async fn test_announcements_lifecycle() {
    let harness = TestHarness::new().await;
    let (_, patient) = harness.register_user("ana@clinic.ph").await;
    let admin = harness.admin_token().await;

    let notice = json!({ "title": "Closed Friday", "description": "Town fiesta" });
    let (status, _) = harness.post("/announcements", &patient, notice.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = harness.post("/announcements", &admin, notice).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["announcement"]["id"].as_i64().unwrap();

    let (status, list) = harness.get("/announcements", &patient).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["title"], "Closed Friday");
    assert_eq!(list[0]["created_by_name"], "Admin");

    let (status, body) = harness
        .put(
            &format!("/announcements/{id}"),
            &admin,
            json!({ "title": "Closed Saturday", "description": "Moved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["announcement"]["title"], "Closed Saturday");

    let (status, _) = harness
        .send(Method::DELETE, &format!("/announcements/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = harness.get(&format!("/announcements/{id}"), &patient).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_announcement_needs_title() {
    let harness = TestHarness::new().await;
    let admin = harness.admin_token().await;
    let (status, body) = harness
        .post("/announcements", &admin, json!({ "description": "No title" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], "validation");
}

#[tokio::test]
async fn test_prenatal_records() {
    let harness = TestHarness::new().await;
    let (user, token) = harness.register_user("ana@clinic.ph").await;

    let (status, info) = harness
        .post(
            "/prenatal-info",
            &token,
            json!({ "name": "Ana Cruz", "age": "27", "husband_age": "30" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{info}");
    assert_eq!(info["user_id"], user);
    assert_eq!(info["age"], 27);
    let id = info["id"].as_i64().unwrap();

    let (status, info) = harness
        .put(
            &format!("/prenatal-info/{id}"),
            &token,
            json!({ "name": "Ana Cruz-Reyes", "occupation": "Nurse" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{info}");
    assert_eq!(info["name"], "Ana Cruz-Reyes");

    // Only staff may delete.
    let (status, _) = harness
        .send(Method::DELETE, &format!("/prenatal-info/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness
        .post("/prenatal-info", &token, json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_no_immunizations_is_not_found() {
    let harness = TestHarness::new().await;
    let admin = harness.admin_token().await;
    let (status, _) = harness.get("/immunizations", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_and_weekly_chart() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    let today = Local::now().date_naive();
    let day = today.format("%Y-%m-%d").to_string();
    harness.create_schedule(&doctor_token, doctor, &day, 2, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (status, _) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, &day, "AM"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stats) = harness.get("/allstats", &doctor_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalAppointments"], 1);
    assert_eq!(stats["pendingAppointments"], 1);
    assert_eq!(stats["totalPatients"], 1);

    let (status, body) = harness.get("/stats/doctor", &doctor_token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Doctor ID is required");

    let (status, mine) = harness
        .get(&format!("/stats/doctor?doctorId={doctor}"), &doctor_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["totalAppointments"], 1);

    let (status, body) = harness.get("/weekly", &doctor_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let points = body["data"]["data"].as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[0]["x"], "Monday");
    let index = today.weekday().num_days_from_monday() as usize;
    assert_eq!(points[index]["y"], 1);
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let harness = TestHarness::new().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/appointments")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let resp = harness.app.clone().oneshot(request).await.unwrap();
    assert!(resp.status().is_success());
    assert!(
        resp.headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
