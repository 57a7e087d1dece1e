use crate::domain::models::{appointment::Appointment, tenant::Tenant};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// iCalendar invite attached to confirmation e-mails.
pub fn generate_ics(tenant: &Tenant, appointment: &Appointment) -> String {
    let mut calendar = Calendar::new();

    let mut description = format!("{} with {}", appointment.service_name, tenant.name);
    if let Some(staff) = &appointment.staff_name {
        description.push_str(&format!(" (staff: {})", staff));
    }

    let ical_event = IcalEvent::new()
        .summary(&appointment.service_name)
        .description(&description)
        .location(&tenant.name)
        .starts(appointment.start_time)
        .ends(appointment.end_time)
        .uid(&appointment.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
