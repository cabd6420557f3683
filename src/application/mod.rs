// Application layer - use cases over the domain
pub mod business_metrics;
pub mod dashboard_service;
pub mod demo_data;
pub mod metric_aggregator;
pub mod session_service;
pub mod sheet_repository;
pub mod streaming_service;
