//! Client core for the events platform: HTTP access, session state, and the
//! screen controllers that drive the user flow.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod navigator;
pub mod partition;
pub mod screens;
pub mod session;
pub mod transport;

pub use app::{App, Screen};
pub use backend::{EventsBackend, MissingBackend};
pub use config::{load_settings, ClientSettings};
pub use error::{ApiFailure, ApiResult};
pub use navigator::{Navigator, Route, Transition};
pub use screens::{Alert, AlertKind, Outcome};
pub use session::{Session, SessionContext};
pub use transport::ApiClient;

#[cfg(test)]
#[path = "tests/fake_backend.rs"]
pub(crate) mod fake_backend;
