pub mod config;
pub mod dns;
pub mod enumerate;
mod error;
pub mod http;
pub mod input;
pub mod modules;
pub mod normalize;
pub mod ports;
pub mod probe;
pub mod progress;
pub mod sink;

pub use error::Error;
