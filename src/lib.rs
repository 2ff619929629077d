pub mod app;
pub mod bridge;
pub mod chat;
pub mod config;
pub mod device;
pub mod runtime;
pub mod sections;
