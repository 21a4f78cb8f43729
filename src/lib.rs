//! Presentation core for the Refracta gallery: a justified mosaic layout
//! engine and a lightbox viewer, both rendering into a headless document.

pub mod album;
pub mod app;
pub mod config;
pub mod dom;
pub mod error;
pub mod layout;
pub mod models;
pub mod probe;
pub mod ui;
