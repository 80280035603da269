//! HTTP boundary for the admission API.

mod server;

pub use server::{router, HttpServer, SmsRequest, SmsResponse};
