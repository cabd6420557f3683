// Domain layer - plain data types shared by every other layer
pub mod credentials;
pub mod metric;
pub mod navigation;
pub mod session;
pub mod source;
pub mod summary;
pub mod table;
