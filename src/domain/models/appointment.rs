use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::domain::models::service::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// pending -> confirmed -> completed, and any non-terminal state -> cancelled.
    /// Re-applying the current status is accepted as a no-op.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: String,
    pub service_name: String,
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub tenant_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub start: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams, service: &Service) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            customer_email: params.customer_email,
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            staff_id: None,
            staff_name: None,
            start_time: params.start,
            end_time: params.start + Duration::minutes(service.duration_min as i64),
            status: AppointmentStatus::Pending.as_str().to_string(),
            notes: params.notes,
            price: service.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rows with an unknown status string are treated as pending so they keep
    /// blocking the staff member's time.
    pub fn status(&self) -> AppointmentStatus {
        self.status.parse().unwrap_or(AppointmentStatus::Pending)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status() == AppointmentStatus::Cancelled
    }

    pub fn set_status(&mut self, status: AppointmentStatus) {
        self.status = status.as_str().to_string();
        self.updated_at = Utc::now();
    }

    pub fn reschedule(&mut self, start: DateTime<Utc>, duration_min: i32) {
        self.start_time = start;
        self.end_time = start + Duration::minutes(duration_min as i64);
        self.updated_at = Utc::now();
    }

    pub fn apply_service(&mut self, service: &Service) {
        self.service_id = service.id.clone();
        self.service_name = service.name.clone();
        self.price = service.price;
        self.end_time = self.start_time + Duration::minutes(service.duration_min as i64);
        self.updated_at = Utc::now();
    }

    pub fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{} | {}", existing, note),
            _ => note.to_string(),
        });
    }
}
