//! Common test utilities and harness for clinic API integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use clinic_api::AppState;
use clinic_auth::PasswordHasher;
use clinic_core::ClinicConfig;
use clinic_core::catalog::SpecialtyInput;
use clinic_core::config::BootstrapConfig;
use clinic_storage::{CatalogStore, MemoryStore};

/// A router over a fresh in-memory store.
pub struct TestHarness {
    /// Router under test
    pub app: Router,
    /// Store behind the router, for seeding and inspection
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Harness with authentication enabled and the default admin created.
    pub async fn new() -> Self {
        Self::with_auth(true).await
    }

    /// Harness with authentication on or off.
    pub async fn with_auth(enabled: bool) -> Self {
        let mut config = ClinicConfig::default();
        config.auth.enabled = enabled;
        config.auth.jwt_secret = "integration-secret".to_string();

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), &config).with_passwords(PasswordHasher::with_cost(4));
        clinic_api::bootstrap_admin(&state, &BootstrapConfig::default())
            .await
            .unwrap();

        Self {
            app: clinic_api::app(state, &config.server),
            store,
        }
    }

    /// Sends one request and decodes the JSON response body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let resp = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// GET with a token.
    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, Some(token), None).await
    }

    /// POST a JSON body with a token.
    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    /// PUT a JSON body with a token.
    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    /// Token for the bootstrap admin.
    pub async fn admin_token(&self) -> String {
        self.admin_login().await.1
    }

    /// Logs in the bootstrap admin and returns `(id, token)`.
    pub async fn admin_login(&self) -> (i64, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/admin/login",
                None,
                Some(json!({ "email": "admin@example.com", "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["admin"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Registers a patient and returns `(id, token)`.
    pub async fn register_user(&self, email: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "fullName": "Maria Santos",
                    "email": email,
                    "password": "password123",
                    "phone": "09171234567",
                    "address": "Purok 2, Poblacion",
                    "birthday": "1994-06-12",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Seeds a specialty, registers a doctor in it and returns `(id, token)`.
    pub async fn register_doctor(&self, email: &str) -> (i64, String) {
        let specialty = self
            .store
            .create_specialty(SpecialtyInput {
                specialty_name: "Obstetrics".to_string(),
                description: Some("Prenatal care".to_string()),
            })
            .await
            .unwrap();

        let (status, body) = self
            .send(
                Method::POST,
                "/doctor/register",
                None,
                Some(json!({
                    "name": "Dr. Reyes",
                    "email": email,
                    "password": "secret1",
                    "birthdate": "1980-03-04",
                    "address": "Clinic Road",
                    "specialization_id": specialty.id,
                    "phone_number": "09170000000",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["doctorId"].as_i64().unwrap();

        let (status, body) = self
            .send(
                Method::POST,
                "/doctor/login",
                None,
                Some(json!({ "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (id, body["token"].as_str().unwrap().to_string())
    }

    /// Creates a schedule for `doctor` on `date` and returns its id.
    pub async fn create_schedule(&self, token: &str, doctor: i64, date: &str, am: u32, pm: u32) -> i64 {
        let (status, body) = self
            .post(
                "/schedules",
                token,
                json!({
                    "doctor_id": doctor,
                    "schedule_date": date,
                    "am_max_patients": am,
                    "pm_max_patients": pm,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

/// A prenatal booking request body.
pub fn prenatal_booking(user: i64, doctor: i64, date: &str, slot: &str) -> Value {
    json!({
        "userId": user,
        "doctorId": doctor,
        "selectedDate": date,
        "purpose": "Prenatal",
        "slotPeriod": slot,
        "formData": {
            "name": "Maria Santos",
            "age": "29",
            "address": "Purok 2",
            "occupation": "Vendor",
            "husband_name": "Jose Santos",
            "husband_age": 31,
        },
    })
}
