//! egui rendering of the dashboard. Everything here reads [`crate::state::AppState`]
//! and the computed [`crate::data::dashboard::Dashboard`]; no metric is
//! computed in this module.

pub mod cards;
pub mod charts;
pub mod panels;
pub mod tables;
