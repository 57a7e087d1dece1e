pub mod appointment;
pub mod auth;
pub mod job;
pub mod schedule;
pub mod service;
pub mod skill;
pub mod tenant;
pub mod timeslot;
pub mod user;
