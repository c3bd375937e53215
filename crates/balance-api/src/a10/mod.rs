// A10 ACOS axAPI v2.1 client
//
// Session-id based API: authenticate, then call `slb.*` methods against a
// single REST endpoint.

pub mod auth;
pub mod client;
pub mod models;
pub mod slb;

pub use client::A10Client;
