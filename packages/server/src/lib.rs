// SMS OTP verification service - API Core
//
// Issues short-lived one-time passcodes over SMS and verifies them.
// The OTP lifecycle lives in domains/auth; kernel/ holds infrastructure
// traits and adapters; server/ is the axum HTTP surface.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
