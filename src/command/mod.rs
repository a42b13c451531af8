pub mod analyze;
pub mod server;
pub mod sources;
