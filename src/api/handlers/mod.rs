pub mod appointment;
pub mod auth;
pub mod customer;
pub mod health;
pub mod job;
pub mod member;
pub mod schedule;
pub mod service;
pub mod skill;
pub mod staff;
pub mod tenant;
pub mod timeslot;
