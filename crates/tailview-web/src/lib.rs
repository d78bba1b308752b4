//! HTTP surface for tailview
//!
//! Serves the viewer page, its static assets, and the selected log tail as JSON.

mod assets;
mod server;

pub use server::{AppState, ViewerSettings, router, serve};
