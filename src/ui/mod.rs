//! # User Interface Module
//!
//! Dear ImGui overlay showing the graphics and haptics rates on top of each view
//! panel. [`UiManager`] owns the ImGui context and renderer; [`labels`] lays out
//! and draws the rate text.

pub mod labels;
pub mod manager;

pub use labels::{draw_rate_labels, label_position, rate_label};
pub use manager::UiManager;
