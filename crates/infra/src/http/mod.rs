//! Thin reqwest wrapper shared by every outbound call

mod client;

pub use client::{HttpClient, HttpClientBuilder};
