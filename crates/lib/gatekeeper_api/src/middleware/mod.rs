//! Request middleware: bearer authentication and per-route authorization guards.

pub mod auth;
pub mod guard;
