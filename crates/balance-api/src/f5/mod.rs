// F5 BIG-IP iControl REST client (read-only LTM inventory)

pub mod client;
pub mod models;

pub use client::F5Client;
