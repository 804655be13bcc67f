pub mod channel;
pub mod config;
pub mod env;
pub mod error;
pub mod io;
pub mod reconcile;
pub mod session;
pub mod status;
pub mod throttle;

pub use error::{ChanopsError, Result};
