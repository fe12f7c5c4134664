pub mod http;

pub use http::{HttpServer, router};
