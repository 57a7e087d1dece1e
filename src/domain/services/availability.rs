use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::models::timeslot::TimeSlot;
use crate::domain::services::{eligibility::StaffOption, scheduling::local_to_utc};

/// Capacity of one slot on one day for one service.
#[derive(Debug, Serialize, Clone)]
pub struct SlotAvailability {
    pub slot_id: String,
    pub shift: String,
    pub start_time: String,
    pub end_time: String,
    /// Qualified staff on duty for the slot.
    pub total_staff: usize,
    /// Of those, staff without a clashing appointment.
    pub available_staff: usize,
}

/// UTC instant at which `slot` begins on `date` in the tenant's zone.
pub fn slot_start(slot: &TimeSlot, date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(date.and_time(slot.start_time), tz)
}

/// Folds the staff options computed for a booking starting at `slot` into counts.
pub fn summarize(slot: &TimeSlot, options: &[StaffOption]) -> SlotAvailability {
    let on_duty = options.iter().filter(|o| o.eligible && o.on_shift);
    SlotAvailability {
        slot_id: slot.id.clone(),
        shift: slot.shift.clone(),
        start_time: slot.start_time.format("%H:%M").to_string(),
        end_time: slot.end_time.format("%H:%M").to_string(),
        total_staff: on_duty.clone().count(),
        available_staff: on_duty.filter(|o| !o.busy).count(),
    }
}
