use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    pub timezone: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMemberRequest {
    pub full_name: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct SetMemberSkillsRequest {
    pub skill_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_min: i32,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration_min: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ServiceListQuery {
    pub active_only: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSkillRequest {
    pub skill_name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSkillRequest {
    pub skill_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct SetSkillServicesRequest {
    pub service_ids: Vec<String>,
}

/// Times are RFC 3339 strings so malformed values surface as `400`.
#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub staff_id: Option<String>,
    pub notes: Option<String>,
}

/// `staff_id: ""` removes the current assignment.
#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub service_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub q: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}

/// Clock times are `HH:MM` in the tenant's zone.
#[derive(Deserialize)]
pub struct CreateTimeSlotRequest {
    pub shift: String,
    pub start_time: String,
    pub end_time: String,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateTimeSlotRequest {
    pub shift: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct TimeSlotListQuery {
    pub shift: Option<String>,
    pub active_only: Option<bool>,
}

#[derive(Deserialize)]
pub struct SlotAvailabilityQuery {
    pub date: String,
    pub service_id: String,
    pub slot_id: Option<String>,
}

/// Without `start_time`/`end_time` the shift spans the tenant's active time
/// slots carrying the same shift name.
#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub user_id: String,
    pub work_date: String,
    pub shift: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateScheduleRequest {
    pub work_date: Option<String>,
    pub shift: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleListQuery {
    pub user_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
}
