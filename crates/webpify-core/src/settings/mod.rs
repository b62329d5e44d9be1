//! Converter settings: persistence service and admin handlers

pub mod handler;
pub mod service;

pub use service::SettingsService;

// vim: ts=4
