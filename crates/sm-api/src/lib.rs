//! # sm-api
//!
//! JSON API for Sew4Mi order tracking.
//!
//! Thin handlers that validate request bodies, call the services, and render
//! `_type`/`_links` documents.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
