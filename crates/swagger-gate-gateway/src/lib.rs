//! HTTP gateway putting Google login in front of swagger-gate documentation.
//!
//! This crate provides the public-facing web surface. It handles:
//!
//! - The `/login` → provider → `/callback` OAuth round trip
//! - Session cookies carrying signed, stateless session tokens
//! - Gating every protected request on a valid, still-allowed session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Browsers                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   swagger-gate-gateway                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │   Request   │ │   Router    │ │    Cookie           │   │
//! │  │   Gate      │ │  + Handlers │ │    Rendering        │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                   ┌────────────────────┐
//!                   │ swagger-gate-auth  │──▶ Google
//!                   └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use swagger_gate_auth::GoogleProvider;
//! use swagger_gate_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let provider = Arc::new(GoogleProvider::new(&config.auth_config())?);
//! let listen_addr = config.listen_addr.clone();
//!
//! let app = create_router(GatewayState::new(config, provider)?);
//!
//! let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cookies;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use gate::AuthStatus;
pub use routes::create_router;
pub use state::GatewayState;
