pub mod api;
pub mod app;
pub mod auth;
pub mod cell_editor;
pub mod cli;
pub mod client;
pub mod config;
pub mod download;
pub mod errors;
pub mod modal;
pub mod models;
pub mod ponto;
pub mod reset;
pub mod session;
pub mod state;
pub mod tables;
pub mod typewriter;
pub mod ui;

pub use client::RequestClient;
pub use config::ClientConfig;
pub use errors::{ClientError, ClientResult, ValidationError};
pub use session::SessionStore;
pub use state::AppState;
