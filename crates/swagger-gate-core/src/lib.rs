//! Core types and utilities for swagger-gate.
//!
//! This crate provides the foundational types shared by the auth and gateway crates:
//!
//! - **Identifiers**: `CorrelationId`, the single-use value binding a login
//!   redirect to its callback
//! - **Email addresses**: `EmailAddress`, with fail-closed domain extraction
//!
//! # Example
//!
//! ```
//! use swagger_gate_core::{CorrelationId, EmailAddress};
//!
//! let correlation = CorrelationId::generate();
//! assert_eq!(correlation.to_string().len(), 36);
//!
//! let email = EmailAddress::new("alice@example.com");
//! assert_eq!(email.domain(), Some("example.com"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod email;
pub mod ids;

pub use email::EmailAddress;
pub use ids::{cache_key_for, CorrelationId, IdError};
