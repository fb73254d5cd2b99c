//! DAElect off-chain proposal details service.
//!
//! Keeps a registry of deployed DAO contract sets and free-text details per
//! (DAO instance, on-chain proposal id), served over a small REST API backed
//! by SQLite.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ports;
pub mod router;
pub mod signature;
pub mod state;

pub use config::ServerConfig;
pub use database::{DatabaseConfig, DatabaseManager};
pub use error::DaoError;
pub use router::build_router;
pub use state::AppState;
