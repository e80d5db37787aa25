//! egui rendering: toolbar, filter panel and the dose plot.

pub mod panels;
pub mod plot;
