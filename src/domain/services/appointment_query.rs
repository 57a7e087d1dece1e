use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::models::appointment::{Appointment, AppointmentStatus};

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// Admin list filters, applied in memory over a tenant snapshot.
#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub query: Option<String>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment, tz: Tz) -> bool {
        if let Some(status) = self.status
            && appointment.status() != status {
            return false;
        }

        let day = appointment.start_time.with_timezone(&tz).date_naive();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let needle = q.to_lowercase();
                appointment.customer_name.to_lowercase().contains(&needle)
                    || appointment.service_name.to_lowercase().contains(&needle)
                    || appointment.customer_phone.contains(q)
            }
            _ => true,
        }
    }

    pub fn apply(&self, appointments: Vec<Appointment>, tz: Tz) -> Vec<Appointment> {
        appointments.into_iter().filter(|a| self.matches(a, tz)).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Zero-based pagination. `per_page` is clamped to `1..=MAX_PER_PAGE`; a page
/// past the end is empty but still reports the total.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total = items.len();
    let items = items
        .into_iter()
        .skip(page.saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page { items, total, page, per_page }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CustomerStats {
    pub total_appointments: usize,
    pub completed_appointments: usize,
    pub total_spent: i64,
}

impl CustomerStats {
    pub fn from_history(history: &[Appointment]) -> Self {
        let completed: Vec<&Appointment> = history
            .iter()
            .filter(|a| a.status() == AppointmentStatus::Completed)
            .collect();

        Self {
            total_appointments: history.len(),
            completed_appointments: completed.len(),
            total_spent: completed.iter().map(|a| a.price).sum(),
        }
    }
}
