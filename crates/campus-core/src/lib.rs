//! Core backoffice library (session, route guard, API gateway, config).

pub mod api;
pub mod config;
pub mod gateway;
pub mod guard;
pub mod navigation;
pub mod session;
