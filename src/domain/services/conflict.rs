//! Staff double-booking detection.
//!
//! Everything here is a pure function over an appointment snapshot handed in by
//! the caller. Nothing is cached: the snapshot for one tenant-day is small and
//! the check is re-run whenever an assignment is proposed.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::models::appointment::Appointment;

/// A half-open time range `[start, end)`.
pub trait TimeRange {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;
}

impl TimeRange for Appointment {
    fn start(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end(&self) -> DateTime<Utc> {
        self.end_time
    }
}

impl TimeRange for (DateTime<Utc>, DateTime<Utc>) {
    fn start(&self) -> DateTime<Utc> {
        self.0
    }

    fn end(&self) -> DateTime<Utc> {
        self.1
    }
}

/// True iff `[a.start, a.end)` and `[b.start, b.end)` intersect.
///
/// Zero-length and inverted ranges are not special-cased; the result is
/// whatever the two inequalities give.
pub fn has_conflict<A: TimeRange + ?Sized, B: TimeRange + ?Sized>(a: &A, b: &B) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// `ConflictChecker` evaluating calendar days in UTC.
pub fn is_staff_busy(staff_id: &str, candidate: &Appointment, appointments: &[Appointment]) -> bool {
    ConflictChecker::new(chrono_tz::UTC).is_staff_busy(staff_id, candidate, appointments)
}

#[derive(Debug, Clone, Copy)]
pub struct ConflictChecker {
    tz: Tz,
}

impl ConflictChecker {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Would assigning `staff_id` to `candidate` collide with another live
    /// appointment of that staff member on the candidate's day?
    pub fn is_staff_busy(&self, staff_id: &str, candidate: &Appointment, appointments: &[Appointment]) -> bool {
        self.first_conflict(staff_id, candidate, appointments).is_some()
    }

    pub fn first_conflict<'a>(
        &self,
        staff_id: &str,
        candidate: &Appointment,
        appointments: &'a [Appointment],
    ) -> Option<&'a Appointment> {
        let day = self.local_date(candidate.start_time);

        let hit = live_for(staff_id, candidate, appointments)
            .filter(|other| self.local_date(other.start_time) == day)
            .find(|other| has_conflict(candidate, *other));

        if let Some(other) = hit {
            debug!(
                staff_id,
                candidate_id = %candidate.id,
                conflicting_id = %other.id,
                "staff member already booked in this time range"
            );
        }
        hit
    }

    /// `first_conflict`, falling back to overlaps with appointments that start on
    /// another local day (a late treatment running past midnight). The storage
    /// guard compares absolute instants, so assignment has to as well.
    pub fn first_blocking<'a>(
        &self,
        staff_id: &str,
        candidate: &Appointment,
        appointments: &'a [Appointment],
    ) -> Option<&'a Appointment> {
        self.first_conflict(staff_id, candidate, appointments).or_else(|| {
            let hit = live_for(staff_id, candidate, appointments).find(|other| has_conflict(candidate, *other));
            if let Some(other) = hit {
                debug!(
                    staff_id,
                    candidate_id = %candidate.id,
                    conflicting_id = %other.id,
                    "staff member booked across the day boundary"
                );
            }
            hit
        })
    }
}

/// Live appointments of `staff_id` other than the candidate itself.
fn live_for<'a>(
    staff_id: &str,
    candidate: &Appointment,
    appointments: &'a [Appointment],
) -> impl Iterator<Item = &'a Appointment> {
    appointments
        .iter()
        .filter(move |other| other.staff_id.as_deref() == Some(staff_id))
        .filter(move |other| other.id != candidate.id)
        .filter(|other| other.is_active && !other.is_cancelled())
}
