pub mod auth;
pub mod workout;

pub use auth::{init, login, logout, refresh, reset, status};
pub use workout::{exercises, preview, upload};
