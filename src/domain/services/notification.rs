use tera::{Context, Tera};

use crate::domain::models::{
    appointment::Appointment,
    job::{JOB_CANCELLATION, JOB_CONFIRMATION, JOB_REMINDER},
    tenant::Tenant,
};
use crate::error::AppError;

pub const CONFIRMATION_TEMPLATE: &str = "confirmation.html";
pub const REMINDER_TEMPLATE: &str = "reminder.html";
pub const CANCELLATION_TEMPLATE: &str = "cancellation.html";

const CONFIRMATION_SUBJECT: &str = "Appointment received: {{ service_name }} on {{ start_date }}";
const REMINDER_SUBJECT: &str = "Reminder: {{ service_name }} at {{ start_clock }}";
const CANCELLATION_SUBJECT: &str = "Appointment cancelled: {{ service_name }}";

pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (CONFIRMATION_TEMPLATE, include_str!("../../templates/confirmation.html")),
        (REMINDER_TEMPLATE, include_str!("../../templates/reminder.html")),
        (CANCELLATION_TEMPLATE, include_str!("../../templates/cancellation.html")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Failed to load e-mail templates: {:?}", e)))?;
    Ok(tera)
}

fn template_for(job_type: &str) -> Option<(&'static str, &'static str)> {
    match job_type {
        JOB_CONFIRMATION => Some((CONFIRMATION_TEMPLATE, CONFIRMATION_SUBJECT)),
        JOB_REMINDER => Some((REMINDER_TEMPLATE, REMINDER_SUBJECT)),
        JOB_CANCELLATION => Some((CANCELLATION_TEMPLATE, CANCELLATION_SUBJECT)),
        _ => None,
    }
}

/// Times are rendered in the tenant's zone.
pub fn build_context(tenant: &Tenant, appointment: &Appointment) -> Context {
    let tz = tenant.tz();
    let start = appointment.start_time.with_timezone(&tz);
    let end = appointment.end_time.with_timezone(&tz);

    let mut context = Context::new();
    context.insert("tenant_name", &tenant.name);
    context.insert("logo_url", &tenant.logo_url.clone().unwrap_or_default());
    context.insert("customer_name", &appointment.customer_name);
    context.insert("service_name", &appointment.service_name);
    context.insert("staff_name", &appointment.staff_name.clone().unwrap_or_default());
    context.insert("start_date", &start.format("%d/%m/%Y").to_string());
    context.insert("start_clock", &start.format("%H:%M").to_string());
    context.insert("end_clock", &end.format("%H:%M").to_string());
    context.insert("timezone", &tenant.timezone);
    context.insert("price", &appointment.price);
    context.insert("notes", &appointment.notes.clone().unwrap_or_default());
    context
}

/// Returns `(subject, html_body)` for a notification job.
pub fn render(tera: &Tera, job_type: &str, tenant: &Tenant, appointment: &Appointment) -> Result<(String, String), AppError> {
    let (template, subject) = template_for(job_type)
        .ok_or_else(|| AppError::InternalWithMsg(format!("No template for job type {}", job_type)))?;

    let context = build_context(tenant, appointment);

    let body = tera.render(template, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;
    let subject = Tera::one_off(subject, &context, false)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera subject render error: {:?}", e)))?;

    Ok((subject, body))
}
