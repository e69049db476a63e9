//! Authentication module: registration, login, bearer sessions.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{AdminContext, AuthContext};
