//! Business-logic services called by the request handlers.

pub mod auth;
