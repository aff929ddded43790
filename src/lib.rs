// Library for tests to access modules

pub mod builder;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod server;
