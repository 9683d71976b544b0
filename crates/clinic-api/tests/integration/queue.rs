//! Visit queue and the appointment lifecycle it drives.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{TestHarness, prenatal_booking};

const DAY: &str = "2030-02-01";

/// Books one AM appointment and returns `(harness, doctor, doctor_token, appointment)`.
async fn booked() -> (TestHarness, i64, String, i64) {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 3, 3).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (status, receipt) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "AM"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    let appointment = receipt["appointment_id"].as_i64().unwrap();
    (harness, doctor, doctor_token, appointment)
}

#[tokio::test]
async fn test_enqueue_approves_and_mark_done_finishes() {
    let (harness, doctor, token, appointment) = booked().await;

    let (status, body) = harness
        .post(
            "/queue",
            &token,
            json!({ "appointment_id": appointment, "assigned_to": doctor }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let queue_id = body["id"].as_i64().unwrap();

    let (_, appt) = harness.get(&format!("/appointments/{appointment}"), &token).await;
    assert_eq!(appt["status"], "Approved");

    let (status, entry) = harness.get(&format!("/queue/{appointment}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["id"], queue_id);
    assert_eq!(entry["status"], "Processing");

    let (status, queue) = harness.get(&format!("/queue/doctor/{doctor}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue[0]["doctor_name"], "Dr. Reyes");
    assert_eq!(queue[0]["appointment_status"], "Approved");

    let (status, body) = harness
        .put(&format!("/queue/{queue_id}/mark-done"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["queue"]["status"], "Done");
    assert!(body["queue"]["processed_at"].is_string());

    let (_, appt) = harness.get(&format!("/appointments/{appointment}"), &token).await;
    assert_eq!(appt["status"], "Done");
}

#[tokio::test]
async fn test_enqueue_twice_is_invalid_transition() {
    let (harness, _, token, appointment) = booked().await;

    let (status, _) = harness
        .post("/queue", &token, json!({ "appointment_id": appointment }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = harness
        .post("/queue", &token, json!({ "appointment_id": appointment }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "invalid_transition");
}

#[tokio::test]
async fn test_reject_only_pending() {
    let (harness, _, token, appointment) = booked().await;

    let (status, _) = harness
        .post("/queue", &token, json!({ "appointment_id": appointment }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = harness
        .put(&format!("/appointments/{appointment}/reject"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "invalid_transition");
}

#[tokio::test]
async fn test_reject_soft_deletes() {
    let (harness, _, token, appointment) = booked().await;

    let (status, body) = harness
        .put(&format!("/appointments/{appointment}/reject"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["appointment"]["status"], "Rejected");

    let (status, _) = harness.get(&format!("/appointments/{appointment}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patients_cannot_touch_the_queue() {
    let (harness, _, _, appointment) = booked().await;
    let (_, patient) = harness.register_user("bea@clinic.ph").await;

    let (status, _) = harness
        .post("/queue", &patient, json!({ "appointment_id": appointment }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_enqueue_requires_appointment_id() {
    let (harness, _, token, _) = booked().await;
    let (status, body) = harness.post("/queue", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "appointment_id");
}

#[tokio::test]
async fn test_empty_doctor_queue_is_not_found() {
    let (harness, doctor, token, _) = booked().await;
    let (status, _) = harness.get(&format!("/queue/doctor/{doctor}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remarks_then_patient_details() {
    let (harness, _, token, appointment) = booked().await;

    let (status, body) = harness
        .put(
            &format!("/appointments/{appointment}/remarks"),
            &token,
            json!({ "remarks": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "remarks");

    let (status, body) = harness
        .put(
            &format!("/appointments/{appointment}/remarks"),
            &token,
            json!({
                "remarks": "Normal fetal heart tone",
                "vitalSigns": { "bp": "110/70", "weight": "58.5" },
                "diagnosis": { "diagnosisText": "G1P0, 20 weeks AOG" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, details) = harness
        .get(&format!("/appointments/{appointment}/patient-details"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["remarks"], "Normal fetal heart tone");
    assert_eq!(details["diagnosis"], "G1P0, 20 weeks AOG");
    assert_eq!(details["bp"], "110/70");
}

#[tokio::test]
async fn test_delete_queue_entry() {
    let (harness, _, token, appointment) = booked().await;
    let (_, body) = harness
        .post("/queue", &token, json!({ "appointment_id": appointment }))
        .await;
    let queue_id = body["id"].as_i64().unwrap();

    let (status, _) = harness
        .send(Method::DELETE, &format!("/queue/{queue_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = harness.get("/queue", &token).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_queue_status_and_assignment() {
    let (harness, doctor, token, appointment) = booked().await;
    let (_, body) = harness
        .post("/queue", &token, json!({ "appointment_id": appointment }))
        .await;
    let queue_id = body["id"].as_i64().unwrap();

    let (status, body) = harness
        .put(
            &format!("/queue/{queue_id}"),
            &token,
            json!({ "status": "done", "assigned_to": doctor }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["queue"]["status"], "Done");
    assert_eq!(body["queue"]["assigned_to"], doctor);
    assert!(body["queue"]["processed_at"].is_string());

    let (status, body) = harness
        .put(
            &format!("/queue/{queue_id}"),
            &token,
            json!({ "status": "Processing" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "invalid_transition");

    let (status, _) = harness
        .put(&format!("/queue/{queue_id}"), &token, json!({ "status": "later" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
