//! Arbor Telemetry - Logging setup and request correlation.
//!
//! This crate provides:
//! - [`setup_logging`], installing a `tracing` subscriber from a [`LogConfig`]
//! - [`RequestContext`], a request id and span for one CLI command
//!
//! The engine crates only emit `tracing` events. Binaries call
//! [`setup_logging`] once at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use arbor_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! setup_logging(&LogConfig::new("info").with_format(LogFormat::Json)).unwrap();
//!
//! let ctx = RequestContext::new("resolver").with_operation("resolve");
//! let _span = ctx.span().entered();
//! tracing::info!("resolving");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
