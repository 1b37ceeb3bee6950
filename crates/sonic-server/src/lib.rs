//! sonic-server - HTTP surface of the synchronizer.
//!
//! - `GET /api/v2/public/config`: public scope of the secret cache
//! - `GET /version`: build version
//! - `GET /metrics`: Prometheus exposition
//! - `POST /api/v2/admin/sync`: run a reconciliation tick now (basic auth)

mod config;
mod error;
mod server;
mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{create_router, run_server};
pub use state::ServerState;
