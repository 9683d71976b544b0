//! Schedules, slot capacity and booking.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{TestHarness, prenatal_booking};

const DAY: &str = "2030-01-15";

#[tokio::test]
async fn test_booking_fills_slot_then_rejects() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    let schedule = harness.create_schedule(&doctor_token, doctor, DAY, 1, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (bea, bea_token) = harness.register_user("bea@clinic.ph").await;

    let (status, receipt) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "am"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["status"], "Pending");
    assert_eq!(receipt["slot"], "AM");
    assert_eq!(receipt["remaining_slots"], 0);

    let (status, body) = harness
        .post("/appointments", &bea_token, prenatal_booking(bea, doctor, DAY, "AM"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "slot_full");

    // PM is a separate bucket.
    let (status, _) = harness
        .post("/appointments", &bea_token, prenatal_booking(bea, doctor, DAY, "PM"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = harness
        .get(&format!("/appointments/remaining/{schedule}"), &doctor_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["am"], 0);
    assert_eq!(body["pm"], 1);
    assert_eq!(body["remaining_slots"], 1);
}

#[tokio::test]
async fn test_deleted_appointment_frees_its_place() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("lim@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 1, 0).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;

    let (_, receipt) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "AM"))
        .await;
    let appointment = receipt["appointment_id"].as_i64().unwrap();

    let (status, _) = harness
        .send(
            axum::http::Method::DELETE,
            &format!("/appointments/{appointment}"),
            Some(&doctor_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, slots) = harness
        .get(&format!("/available-slots?doctorId={doctor}"), &ana_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots[0]["schedule_date"], DAY);
    assert_eq!(slots[0]["am"]["remaining_slots"], 1);

    let (status, _) = harness
        .get(&format!("/appointments/{appointment}"), &ana_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_without_schedule_is_not_found() {
    let harness = TestHarness::new().await;
    let (doctor, _) = harness.register_doctor("cruz@clinic.ph").await;
    let (ana, token) = harness.register_user("ana@clinic.ph").await;

    let (status, body) = harness
        .post("/appointments", &token, prenatal_booking(ana, doctor, DAY, "AM"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["category"], "not_found");
}

#[tokio::test]
async fn test_booking_validation() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("dela@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 3, 3).await;
    let (ana, token) = harness.register_user("ana@clinic.ph").await;

    let mut body = prenatal_booking(ana, doctor, DAY, "AM");
    body["purpose"] = json!("Dental");
    let (status, resp) = harness.post("/appointments", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"]["field"], "purpose");

    let mut body = prenatal_booking(ana, doctor, DAY, "AM");
    body["slotPeriod"] = json!("noon");
    let (status, _) = harness.post("/appointments", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = prenatal_booking(ana, doctor, DAY, "AM");
    body["formData"]["name"] = json!("  ");
    let (status, _) = harness.post("/appointments", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patient_cannot_book_for_someone_else() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("ong@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 3, 3).await;
    let (_, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (bea, _) = harness.register_user("bea@clinic.ph").await;

    let (status, _) = harness
        .post("/appointments", &ana_token, prenatal_booking(bea, doctor, DAY, "AM"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_schedule_conflicts() {
    let harness = TestHarness::new().await;
    let (doctor, token) = harness.register_doctor("tan@clinic.ph").await;
    harness.create_schedule(&token, doctor, DAY, 5, 5).await;

    let (status, body) = harness
        .post(
            "/schedules",
            &token,
            json!({
                "doctor_id": doctor,
                "schedule_date": DAY,
                "am_max_patients": 1,
                "pm_max_patients": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "conflict");
}

#[tokio::test]
async fn test_schedule_validation() {
    let harness = TestHarness::new().await;
    let (doctor, token) = harness.register_doctor("uy@clinic.ph").await;

    let (status, body) = harness
        .post(
            "/schedules",
            &token,
            json!({
                "doctor_id": doctor,
                "schedule_date": "15/01/2030",
                "am_max_patients": 1,
                "pm_max_patients": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("YYYY-MM-DD"));

    let (status, _) = harness
        .post(
            "/schedules",
            &token,
            json!({
                "doctor_id": doctor,
                "schedule_date": DAY,
                "am_max_patients": -1,
                "pm_max_patients": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patients_cannot_create_schedules() {
    let harness = TestHarness::new().await;
    let (doctor, _) = harness.register_doctor("go@clinic.ph").await;
    let (_, patient) = harness.register_user("ana@clinic.ph").await;

    let (status, _) = harness
        .post(
            "/schedules",
            &patient,
            json!({
                "doctor_id": doctor,
                "schedule_date": DAY,
                "am_max_patients": 1,
                "pm_max_patients": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_doctor_schedules_with_date_lookup() {
    let harness = TestHarness::new().await;
    let (doctor, token) = harness.register_doctor("sy@clinic.ph").await;

    let (status, _) = harness
        .get(&format!("/schedules/doctor/{doctor}"), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    harness.create_schedule(&token, doctor, DAY, 2, 2).await;
    let (status, body) = harness
        .get(&format!("/schedules/doctor/{doctor}?date={DAY}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["schedules"][0]["doctor_specialization"], "Obstetrics");

    let (_, body) = harness
        .get(&format!("/schedules/doctor/{doctor}?date=2030-01-16"), &token)
        .await;
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn test_board_groups_by_slot() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("see@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 2, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;

    let (status, _) = harness
        .get(&format!("/appointments/doctor/{doctor}"), &doctor_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = harness.get("/appointments", &doctor_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = harness
        .get(&format!("/appointments/user/{ana}"), &ana_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "PM"))
        .await;
    let (status, all) = harness.get("/appointments", &doctor_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["PM"].as_array().unwrap().len(), 1);
    let (status, board) = harness
        .get(&format!("/appointments/doctor/{doctor}"), &doctor_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["AM"].as_array().unwrap().len(), 0);
    assert_eq!(board["PM"][0]["user_email"], "ana@clinic.ph");

    let (status, mine) = harness
        .get(&format!("/appointments/user/{ana}"), &ana_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["doctor_name"], "Dr. Reyes");
}

#[tokio::test]
async fn test_deleted_schedule_leaves_listing_and_frees_the_date() {
    let harness = TestHarness::new().await;
    let (doctor, token) = harness.register_doctor("yu@clinic.ph").await;
    let schedule = harness.create_schedule(&token, doctor, DAY, 2, 2).await;

    let (status, all) = harness.get("/schedules", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all[0]["schedule_id"], schedule);
    assert_eq!(all[0]["doctor_email"], "yu@clinic.ph");

    let (status, _) = harness
        .send(
            axum::http::Method::DELETE,
            &format!("/schedules/{schedule}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = harness.get("/schedules", &token).await;
    assert!(all.as_array().unwrap().is_empty());
    let (status, _) = harness
        .get(&format!("/appointments/remaining/{schedule}"), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The date is free for a new live schedule.
    harness.create_schedule(&token, doctor, DAY, 1, 1).await;
}

#[tokio::test]
async fn test_detailed_listing_joins_doctor_and_schedule() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("chua@clinic.ph").await;

    let (status, _) = harness.get("/appointments/details", &doctor_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let schedule = harness.create_schedule(&doctor_token, doctor, DAY, 2, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "AM"))
        .await;

    let (status, details) = harness.get("/appointments/details", &doctor_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details[0]["user_name"], "Maria Santos");
    assert_eq!(details[0]["doctor_name"], "Dr. Reyes");
    assert_eq!(details[0]["schedule_id"], schedule);
    assert_eq!(details[0]["schedule_date"], DAY);
}

#[tokio::test]
async fn test_booking_accepts_ids_sent_as_text() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 2, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;

    let mut body = prenatal_booking(ana, doctor, DAY, "AM");
    body["userId"] = json!(ana.to_string());
    body["doctorId"] = json!(doctor.to_string());
    let (status, receipt) = harness.post("/appointments", &ana_token, body).await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["remaining_slots"], 1);

    let mut body = prenatal_booking(ana, doctor, DAY, "AM");
    body["userId"] = json!("me");
    let (status, body) = harness.post("/appointments", &ana_token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_update_appointment_keeps_slot_capacity() {
    const FULL_DAY: &str = "2030-01-16";
    const WIDE_DAY: &str = "2030-01-17";

    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    let full = harness.create_schedule(&doctor_token, doctor, FULL_DAY, 1, 1).await;
    let home = harness.create_schedule(&doctor_token, doctor, DAY, 1, 1).await;
    let wide = harness.create_schedule(&doctor_token, doctor, WIDE_DAY, 2, 0).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (bea, bea_token) = harness.register_user("bea@clinic.ph").await;

    let (status, _) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, FULL_DAY, "AM"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, receipt) = harness
        .post("/appointments", &bea_token, prenatal_booking(bea, doctor, DAY, "AM"))
        .await;
    let appointment = receipt["appointment_id"].as_i64().unwrap();
    let path = format!("/appointments/{appointment}");

    let (status, body) = harness
        .put(&path, &doctor_token, json!({ "schedule_id": full }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"]["category"], "slot_full");
    let (_, remaining) = harness
        .get(&format!("/appointments/remaining/{full}"), &doctor_token)
        .await;
    assert_eq!(remaining["am"], 0);

    let (status, _) = harness
        .put(&path, &doctor_token, json!({ "schedule_id": 99999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, listed) = harness
        .get(&format!("/appointments/user/{bea}"), &bea_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = harness
        .put(&path, &doctor_token, json!({ "appointment_date": WIDE_DAY }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["field"], "appointment_date");

    let (status, moved) = harness
        .put(&path, &doctor_token, json!({ "schedule_id": wide, "status": "Approved" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["schedule_id"], wide);
    assert_eq!(moved["appointment_date"], WIDE_DAY);
    assert_eq!(moved["status"], "Approved");

    let (_, remaining) = harness
        .get(&format!("/appointments/remaining/{wide}"), &doctor_token)
        .await;
    assert_eq!(remaining["am"], 1);
    let (_, remaining) = harness
        .get(&format!("/appointments/remaining/{home}"), &doctor_token)
        .await;
    assert_eq!(remaining["am"], 1);
}

#[tokio::test]
async fn test_update_appointment_enforces_status_workflow() {
    let harness = TestHarness::new().await;
    let (doctor, doctor_token) = harness.register_doctor("reyes@clinic.ph").await;
    harness.create_schedule(&doctor_token, doctor, DAY, 2, 2).await;
    let (ana, ana_token) = harness.register_user("ana@clinic.ph").await;
    let (_, receipt) = harness
        .post("/appointments", &ana_token, prenatal_booking(ana, doctor, DAY, "PM"))
        .await;
    let path = format!("/appointments/{}", receipt["appointment_id"]);

    let (status, _) = harness
        .put(&path, &ana_token, json!({ "status": "Approved" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = harness
        .put(&path, &doctor_token, json!({ "status": "Done" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], "invalid_transition");

    let (status, body) = harness
        .put(&path, &doctor_token, json!({ "status": "cancelled" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "status");

    let (status, body) = harness
        .put(
            &path,
            &doctor_token,
            json!({ "status": "approved", "purpose_of_appointment": "Immunization" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "Approved");
    assert_eq!(body["purpose_of_appointment"], "Immunization");
}
