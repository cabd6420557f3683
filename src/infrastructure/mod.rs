// Infrastructure layer - External dependencies and adapters
pub mod chunked_stream;
pub mod config;
pub mod google_sheets;
pub mod http_response;
pub mod sheet_cache;
