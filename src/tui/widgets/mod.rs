//! TUI widgets

pub mod chrome;
pub mod help;
pub mod models;
pub mod overview;
pub mod revenue;
pub mod seasonal;
pub mod tabs;
pub mod trends;
pub mod variance;
