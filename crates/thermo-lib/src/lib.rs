pub mod bound;
pub mod command;
pub mod config;
pub mod error;
pub mod io;
pub mod plot;
pub mod router;
pub mod signal;
pub mod state;

pub use error::{Error, Result};
