mod config;

pub use config::{AppConfig, GoogleCredentials};
