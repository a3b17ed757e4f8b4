//! hearth-gateway — HTTP boundary for hearth
//!
//! Axum REST server exposing the agent dispatcher plus the CRUD
//! subsystems (chores, inventory, finance, meals) under `/api/v1`.

pub mod agents;
pub mod chores;
pub mod error;
pub mod finance;
pub mod inventory;
pub mod meals;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayServer, GatewayState};
