//! Which staff are on duty for a given appointment.

use chrono_tz::Tz;

use crate::domain::models::{appointment::Appointment, schedule::StaffSchedule};

/// The published shifts of a tenant, usually for a single local day.
///
/// A day without any shifts is unrestricted: every staff member counts as on
/// duty. Once one shift is published for a day, only staff whose shift covers
/// the whole appointment are on duty.
pub struct Roster<'a> {
    shifts: Vec<&'a StaffSchedule>,
}

impl<'a> Roster<'a> {
    pub fn new(entries: &'a [StaffSchedule]) -> Self {
        Self { shifts: entries.iter().filter(|s| !s.is_cancelled()).collect() }
    }

    pub fn unrestricted() -> Self {
        Self { shifts: Vec::new() }
    }

    pub fn is_on_shift(&self, staff_id: &str, candidate: &Appointment, tz: Tz) -> bool {
        let start = candidate.start_time.with_timezone(&tz).naive_local();
        let end = candidate.end_time.with_timezone(&tz).naive_local();
        let day = start.date();

        let mut published = self.shifts.iter().filter(|s| s.work_date == day).peekable();
        if published.peek().is_none() {
            return true;
        }
        published.any(|s| s.user_id == staff_id && s.covers(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{appointment::NewAppointmentParams, service::Service};
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn booking(hour: u32, minutes: i32) -> Appointment {
        let service = Service::new("t1".into(), "Facial".into(), None, 300_000, minutes);
        Appointment::new(
            NewAppointmentParams {
                tenant_id: "t1".into(),
                customer_name: "Lan".into(),
                customer_phone: "0900000000".into(),
                customer_email: None,
                start: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
                notes: None,
            },
            &service,
        )
    }

    fn shift(user: &str, from: NaiveTime, to: NaiveTime) -> StaffSchedule {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        StaffSchedule::new("t1".into(), user.into(), date, "morning".into(), from, to)
    }

    #[test]
    fn test_unpublished_day_is_open() {
        assert!(Roster::unrestricted().is_on_shift("hoa", &booking(9, 60), chrono_tz::UTC));
        let other_day = vec![StaffSchedule {
            work_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            ..shift("mai", hm(8, 0), hm(12, 0))
        }];
        assert!(Roster::new(&other_day).is_on_shift("hoa", &booking(9, 60), chrono_tz::UTC));
    }

    #[test]
    fn test_shift_must_cover_whole_booking() {
        let entries = vec![shift("hoa", hm(8, 0), hm(12, 0))];
        let roster = Roster::new(&entries);

        assert!(roster.is_on_shift("hoa", &booking(9, 60), chrono_tz::UTC));
        assert!(roster.is_on_shift("hoa", &booking(11, 60), chrono_tz::UTC));
        assert!(!roster.is_on_shift("hoa", &booking(11, 90), chrono_tz::UTC));
        assert!(!roster.is_on_shift("mai", &booking(9, 60), chrono_tz::UTC));
    }

    #[test]
    fn test_cancelled_shifts_are_ignored() {
        let mut cancelled = shift("hoa", hm(8, 0), hm(12, 0));
        cancelled.status = "cancelled".into();
        let entries = vec![cancelled, shift("mai", hm(8, 0), hm(12, 0))];

        assert!(!Roster::new(&entries).is_on_shift("hoa", &booking(9, 60), chrono_tz::UTC));
    }
}
