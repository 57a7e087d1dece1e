pub mod appointment_query;
pub mod auth_service;
pub mod availability;
pub mod calendar;
pub mod conflict;
pub mod eligibility;
pub mod notification;
pub mod roster;
pub mod scheduling;
