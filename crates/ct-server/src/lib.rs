//! `ct-server` — HTTP front end for the city traffic twin.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`config`]  | clap `Cli` (flags + environment), parameter conversion    |
//! | [`logging`] | `tracing-subscriber` setup (plain or JSON)                |
//! | [`state`]   | `AppState` shared by all handlers                         |
//! | [`api`]     | axum router, handlers, `ApiError`                         |
//! | [`refresh`] | tokio task that regenerates the live snapshot             |

pub mod api;
pub mod config;
pub mod logging;
pub mod refresh;
pub mod state;

pub use api::{ApiError, build_router};
pub use config::{Cli, LogFormat};
pub use logging::init_logging;
pub use refresh::spawn_refresh;
pub use state::AppState;
