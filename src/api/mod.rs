//! API Module
//!
//! HTTP handlers and routing for the cache REST API.
//!
//! # Endpoints
//! - `PUT /items` - Cache a value
//! - `DELETE /items` - Clear the cache
//! - `GET /items/:key` - Look up a value
//! - `DELETE /items/:key` - Delete a value
//! - `GET /keys` - List cached keys
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
