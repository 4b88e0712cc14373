//! Access to the marketing platform's REST API

pub mod client;
pub mod listing;

pub use client::{ApiClient, Method, ReqwestClient};
pub use listing::Pages;
