// Presentation layer - HTTP routes, handlers and HTML rendering
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
