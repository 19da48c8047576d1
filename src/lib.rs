// Library exports for the journal
// Lets the binary and the integration tests share one module tree

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod naming;
pub mod routes;
pub mod state;
pub mod store;
pub mod visibility;
