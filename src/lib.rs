//! edgeport is a small HTTP edge service.
//!
//! It serves a static frontend, forwards path-prefixed requests to
//! reverse-proxy upstreams, and exposes a single-user demo session API,
//! all driven by a layered `key = value` configuration.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Layered configuration: defaults, config file, and
//!   environment overrides merged into one [`LoadedAppConfig`](config::model::LoadedAppConfig).
//! - [`json_field`] -- Textual string/bool field lookup for request bodies.
//! - [`auth`] -- Mutex-guarded session state and its HTTP handlers.
//! - [`error`] -- Error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON, pretty, and log-file output.
//! - [`proxy`] -- Prefix route matching, header construction, and forwarding
//!   in buffered (`http`) or streaming (`raw`) mode, with a static file fallback.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod json_field;
pub mod logging;
pub mod proxy;
pub mod server;
