use std::result;
use std::error::Error;
pub type SdResult<T> = result::Result<T, Box<dyn Error>>;

pub mod logger;
pub mod config;
pub mod utils;
pub mod cache;
pub mod guard;
pub mod sedes;
pub mod slots;
pub mod board;
pub mod session;
pub mod services;
pub mod shell;
