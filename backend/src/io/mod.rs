//! # IO Layer
//!
//! Exposes the storage collections over HTTP. Pure translation: requests
//! become collection calls, outcomes become status codes.

pub mod rest;
