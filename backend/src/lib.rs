//! Blog API library
//!
//! This library exposes the store, services and router of the blog API
//! for the binary and for integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod services;
