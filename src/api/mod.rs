pub mod cache;
pub mod cached_client;
pub mod client;
pub mod params;
pub mod types;
