use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, auth, customer, health, job, member, schedule, service, skill, staff, tenant, timeslot};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Tenants
        .route("/api/v1/tenants/by-slug/{slug}", get(tenant::get_tenant_by_slug))
        .route("/api/v1/tenants", post(tenant::create_tenant).put(tenant::update_tenant).get(tenant::get_current_tenant))

        // Staff accounts
        .route("/api/v1/{tenant_id}/members", post(member::create_member).get(member::list_members))
        .route("/api/v1/{tenant_id}/members/{user_id}", put(member::update_member).delete(member::delete_member))
        .route("/api/v1/{tenant_id}/members/{user_id}/skills", get(member::get_member_skills).put(member::set_member_skills))

        // Service catalog
        .route("/api/v1/{tenant_id}/services", get(service::list_services).post(service::create_service))
        .route("/api/v1/{tenant_id}/services/{service_id}", get(service::get_service).put(service::update_service).delete(service::delete_service))

        // Skills
        .route("/api/v1/{tenant_id}/skills", get(skill::list_skills).post(skill::create_skill))
        .route("/api/v1/{tenant_id}/skills/{skill_id}", put(skill::update_skill).delete(skill::delete_skill))
        .route("/api/v1/{tenant_id}/skills/{skill_id}/services", get(skill::get_skill_services).put(skill::set_skill_services))

        // Time slots
        .route("/api/v1/{tenant_id}/timeslots", get(timeslot::list_timeslots).post(timeslot::create_timeslot))
        .route("/api/v1/{tenant_id}/timeslots/available", get(timeslot::slot_availability))
        .route("/api/v1/{tenant_id}/timeslots/{slot_id}", put(timeslot::update_timeslot).delete(timeslot::deactivate_timeslot))

        // Staff shifts
        .route("/api/v1/{tenant_id}/schedules", get(schedule::list_schedules).post(schedule::create_schedule))
        .route("/api/v1/{tenant_id}/schedules/{schedule_id}", put(schedule::update_schedule).delete(schedule::delete_schedule))

        // Appointments
        .route("/api/v1/{tenant_id}/appointments", post(appointment::create_appointment).get(appointment::list_appointments))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}", get(appointment::get_appointment).put(appointment::update_appointment).delete(appointment::delete_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/status", put(appointment::update_status))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/cancel", post(appointment::cancel_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/staff-options", get(appointment::get_staff_options))

        // Customers
        .route("/api/v1/{tenant_id}/customers/history", get(customer::customer_history))
        .route("/api/v1/{tenant_id}/customers/stats", get(customer::customer_stats))

        // Staff portal
        .route("/api/v1/{tenant_id}/staff/me/appointments", get(staff::my_appointments))
        .route("/api/v1/{tenant_id}/staff/me/schedules", get(staff::my_schedules))

        // Notification jobs
        .route("/api/v1/{tenant_id}/jobs", get(job::list_jobs))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
