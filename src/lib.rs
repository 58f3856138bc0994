pub mod app;
pub mod config;
pub mod datatypes;
pub mod devices;
pub mod signals;
pub mod util;
