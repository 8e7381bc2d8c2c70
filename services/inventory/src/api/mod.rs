//! API 层

pub mod rest;

pub use rest::{AppState, router};
