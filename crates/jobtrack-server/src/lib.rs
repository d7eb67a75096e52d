//! `jobtrack-server` — the HTTP surface: pages, API, login, sessions.
//!
//! The binary in `main.rs` wires the stores, mailer, and scheduler together;
//! everything else lives here so the integration tests can drive the router
//! directly.
//!
//! | Module    | Purpose                                       |
//! |-----------|-----------------------------------------------|
//! | `app`     | Shared state and router assembly              |
//! | `error`   | API error type with its HTTP mappings         |
//! | `http`    | Request handlers                              |
//! | `oauth`   | Discord authorization-code flow               |
//! | `session` | Signed-cookie session registry and auth gate  |

pub mod app;
pub mod error;
pub mod http;
pub mod oauth;
pub mod session;

pub use app::{build_router, AppState};
pub use error::ApiError;
