use std::collections::HashSet;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::models::{
    appointment::{Appointment, AppointmentStatus},
    job::{Job, JOB_CANCELLATION, JOB_CONFIRMATION, JOB_REMINDER},
    user::User,
};
use crate::domain::services::{conflict::ConflictChecker, eligibility::is_qualified, roster::Roster};
use crate::error::AppError;

pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// UTC bounds `[start, end)` of a local calendar day.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(date.and_time(chrono::NaiveTime::MIN), tz);
    let end = local_to_utc((date + Duration::days(1)).and_time(chrono::NaiveTime::MIN), tz);
    (start, end)
}

/// Notifications queued with a new booking. Nothing is queued without an e-mail
/// address, and a reminder whose send time has already passed is skipped.
pub fn booking_jobs(appointment: &Appointment, reminder_lead_hours: i64, now: DateTime<Utc>) -> Vec<Job> {
    if appointment.customer_email.as_deref().is_none_or(str::is_empty) {
        return vec![];
    }

    let mut jobs = vec![Job::new(JOB_CONFIRMATION, appointment.id.clone(), appointment.tenant_id.clone(), now)];
    jobs.extend(reminder_job(appointment, reminder_lead_hours, now));
    jobs
}

/// Also used to re-queue the reminder after a reschedule.
pub fn reminder_job(appointment: &Appointment, reminder_lead_hours: i64, now: DateTime<Utc>) -> Option<Job> {
    if appointment.customer_email.as_deref().is_none_or(str::is_empty) {
        return None;
    }
    let remind_at = appointment.start_time - Duration::hours(reminder_lead_hours);
    (remind_at > now).then(|| Job::new(JOB_REMINDER, appointment.id.clone(), appointment.tenant_id.clone(), remind_at))
}

pub fn cancellation_jobs(appointment: &Appointment, now: DateTime<Utc>) -> Vec<Job> {
    if appointment.customer_email.as_deref().is_none_or(str::is_empty) {
        return vec![];
    }
    vec![Job::new(JOB_CANCELLATION, appointment.id.clone(), appointment.tenant_id.clone(), now)]
}

pub fn ensure_transition(current: AppointmentStatus, next: AppointmentStatus) -> Result<(), AppError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!("Cannot change status from {} to {}", current, next)))
    }
}

/// Cancellation is refused for finished appointments and for days that are
/// already over in the tenant's zone.
pub fn ensure_cancellable(appointment: &Appointment, today: NaiveDate, tz: Tz) -> Result<(), AppError> {
    match appointment.status() {
        AppointmentStatus::Cancelled => return Err(AppError::Conflict("Appointment is already cancelled".into())),
        AppointmentStatus::Completed => return Err(AppError::Conflict("Completed appointments cannot be cancelled".into())),
        _ => {}
    }
    if appointment.start_time.with_timezone(&tz).date_naive() < today {
        return Err(AppError::Validation("Past appointments cannot be cancelled".into()));
    }
    Ok(())
}

/// Checks that `staff` may take `candidate`: an active staff account holding a
/// skill for the service, on duty for the whole booking, with no overlapping
/// appointment.
pub fn ensure_assignable(
    staff: &User,
    held_skill_ids: &HashSet<&str>,
    required_skill_ids: &[String],
    candidate: &Appointment,
    snapshot: &[Appointment],
    roster: &Roster,
    checker: &ConflictChecker,
) -> Result<(), AppError> {
    if !staff.is_assignable() {
        return Err(AppError::Validation(format!("{} cannot be assigned to appointments", staff.full_name)));
    }
    if !is_qualified(held_skill_ids, required_skill_ids) {
        return Err(AppError::Conflict(format!("{} is not qualified for {}", staff.full_name, candidate.service_name)));
    }
    let tz = checker.tz();
    if !roster.is_on_shift(&staff.id, candidate, tz) {
        return Err(AppError::Conflict(format!("{} is not on shift at that time", staff.full_name)));
    }
    if let Some(other) = checker.first_blocking(&staff.id, candidate, snapshot) {
        return Err(AppError::Conflict(format!(
            "{} is already booked from {} to {}",
            staff.full_name,
            other.start_time.with_timezone(&tz).format("%d/%m %H:%M"),
            other.end_time.with_timezone(&tz).format("%d/%m %H:%M"),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{appointment::NewAppointmentParams, service::Service, user::ROLE_STAFF};

    fn appointment(email: Option<&str>, start: DateTime<Utc>) -> Appointment {
        let service = Service::new("t1".into(), "Facial".into(), None, 300_000, 60);
        Appointment::new(
            NewAppointmentParams {
                tenant_id: "t1".into(),
                customer_name: "Lan".into(),
                customer_phone: "0900000000".into(),
                customer_email: email.map(String::from),
                start,
                notes: None,
            },
            &service,
        )
    }

    #[test]
    fn test_booking_jobs_skip_reminder_in_the_past() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let far = appointment(Some("lan@example.com"), now + Duration::days(3));
        let types: Vec<_> = booking_jobs(&far, 24, now).into_iter().map(|j| j.job_type).collect();
        assert_eq!(types, vec![JOB_CONFIRMATION, JOB_REMINDER]);

        let soon = appointment(Some("lan@example.com"), now + Duration::hours(2));
        let types: Vec<_> = booking_jobs(&soon, 24, now).into_iter().map(|j| j.job_type).collect();
        assert_eq!(types, vec![JOB_CONFIRMATION]);

        let no_mail = appointment(None, now + Duration::days(3));
        assert!(booking_jobs(&no_mail, 24, now).is_empty());
        assert!(cancellation_jobs(&no_mail, now).is_empty());
    }

    #[test]
    fn test_cancel_rules() {
        let tz: Tz = "Asia/Ho_Chi_Minh".parse().unwrap();
        let mut a = appointment(None, Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        assert!(ensure_cancellable(&a, today, tz).is_ok());
        assert!(matches!(ensure_cancellable(&a, today.succ_opt().unwrap(), tz), Err(AppError::Validation(_))));

        a.set_status(AppointmentStatus::Completed);
        assert!(matches!(ensure_cancellable(&a, today, tz), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_unqualified_staff_is_rejected() {
        let a = appointment(None, Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap());
        let staff = User::new("t1".into(), "hoa".into(), "x".into(), ROLE_STAFF, "Hoa".into());
        let checker = ConflictChecker::new(chrono_tz::UTC);
        let required = vec!["skill-nails".to_string()];

        let held: HashSet<&str> = ["skill-massage"].into_iter().collect();
        assert!(matches!(
            ensure_assignable(&staff, &held, &required, &a, &[], &Roster::unrestricted(), &checker),
            Err(AppError::Conflict(_))
        ));

        let held: HashSet<&str> = ["skill-nails"].into_iter().collect();
        assert!(ensure_assignable(&staff, &held, &required, &a, &[], &Roster::unrestricted(), &checker).is_ok());
    }

    #[test]
    fn test_day_bounds_follow_tenant_zone() {
        let tz: Tz = "Asia/Ho_Chi_Minh".parse().unwrap();
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), tz);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 31, 17, 0, 0).unwrap());
        assert_eq!(end - start, Duration::hours(24));
    }
}
