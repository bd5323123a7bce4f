//! API Module
//!
//! HTTP handlers and routing that expose the cache to application code.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `POST /pop/:key` - Remove a key and return its value
//! - `GET /keys`, `GET /values` - Point-in-time snapshots
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
