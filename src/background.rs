use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;
use crate::domain::models::job::{Job, JOB_CONFIRMATION};
use crate::domain::services::{calendar::generate_ics, notification};
use crate::error::AppError;

const POLL_INTERVAL_SECS: u64 = 5;
const BATCH_SIZE: i32 = 10;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    loop {
        if let Err(e) = run_pending_jobs(&state).await {
            error!("Failed to fetch pending jobs: {:?}", e);
        }
        sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
    }
}

/// Claims one batch of due jobs and runs each to a terminal status.
/// Returns the number of jobs claimed.
pub async fn run_pending_jobs(state: &Arc<AppState>) -> Result<usize, AppError> {
    let jobs = state.job_repo.find_pending(BATCH_SIZE).await?;
    let claimed = jobs.len();

    for job in jobs {
        let span = info_span!(
            "background_job",
            job_id = %job.id,
            job_type = %job.job_type,
            tenant_id = %job.payload.tenant_id
        );

        async {
            info!("Processing job");
            match process_job(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Job failed with error: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
            .instrument(span)
            .await;
    }

    Ok(claimed)
}

async fn process_job(state: &AppState, job: &Job) -> Result<(), AppError> {
    let appointment_id = &job.payload.appointment_id;
    let tenant_id = &job.payload.tenant_id;

    let tenant = state.tenant_repo.find_by_id(tenant_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;
    let appointment = state.appointment_repo.find_by_id(tenant_id, appointment_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))?;

    let Some(recipient) = appointment.customer_email.as_deref().filter(|e| !e.is_empty()) else {
        info!("Appointment {} has no customer e-mail, nothing to send", appointment.id);
        return Ok(());
    };

    let (subject, body) = notification::render(&state.templates, &job.job_type, &tenant, &appointment)?;

    let invite = (job.job_type == JOB_CONFIRMATION).then(|| generate_ics(&tenant, &appointment).into_bytes());
    let attachment_name = invite.as_ref().map(|_| "appointment.ics");

    info!("Sending {} e-mail to {}", job.job_type, recipient);
    state.email_service.send(recipient, &subject, &body, attachment_name, invite.as_deref()).await
}
