//! `jobtrack-store` — SQLite persistence for jobs and users.
//!
//! # Overview
//!
//! A single database file holds both tables. [`db::init_db`] creates the
//! schema and applies column migrations on startup; [`jobs::JobStore`] and
//! [`users::UserStore`] each own their own connection behind a `Mutex`.
//!
//! | Module  | Purpose                                        |
//! |---------|------------------------------------------------|
//! | `db`    | Connection opening, schema, column migrations  |
//! | `jobs`  | Application CRUD and per-status counts         |
//! | `users` | Discord-keyed accounts and reminder settings   |

pub mod db;
pub mod error;
pub mod jobs;
pub mod users;

pub use error::{Result, StoreError};
pub use jobs::JobStore;
pub use users::UserStore;
