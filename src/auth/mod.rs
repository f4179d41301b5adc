//! Authentication: sessions, gates, passwords and the login flow

pub mod gates;
pub mod handlers;
pub mod password;
pub mod session;

pub use gates::{Authorize, CurrentUser, Flow, Gate, GateChain, SetCurrentUser};
