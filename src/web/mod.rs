//! JSON HTTP API.

pub mod handlers;
pub mod server;
pub mod session;

pub use server::{AppState, ServerHandle, build_router, start_server};
pub use session::CurrentSession;
