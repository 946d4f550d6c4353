//! API route handlers

pub mod dashboard;
pub mod health;
pub mod refresh;
pub mod stats;
pub mod views;
