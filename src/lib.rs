pub mod asset;
pub mod cleanup;
pub mod config;
pub mod decompress;
pub mod error;
pub mod http;
pub mod install;
pub mod manifest;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod runtime;
