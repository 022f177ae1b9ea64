pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod services;
pub mod steps;
pub mod validation;
pub mod workflow;

pub use config::{ServiceConfig, SimulationConfig};
pub use error::{ClaimError, ClaimResult};
pub use service::{AppState, build_router, create_app};
pub use workflow::{build_claim_wizard, create_flow_runner, help_notification};
