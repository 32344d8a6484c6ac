//! Port adapters backed by external libraries.

pub mod reqwest_client;

pub use reqwest_client::ReqwestHttpClient;
