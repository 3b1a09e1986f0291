//! Services module
//!
//! Business logic services that coordinate between routes and repository.

pub mod blogs;

pub use blogs::BlogsService;
