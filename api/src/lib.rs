//! HTTP surface of the credential-lifecycle service
//!
//! Exposes token refresh, logout, "log out everywhere" and password reset
//! over actix-web. Every rejected credential renders the same 401 body.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
