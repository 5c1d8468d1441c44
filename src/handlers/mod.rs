// src/handlers/mod.rs

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod feedback;
pub mod manual;
pub mod quiz;
