// src/models/mod.rs

pub mod attempt;
pub mod feedback;
pub mod manual;
pub mod quiz;
pub mod user;
