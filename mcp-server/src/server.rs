pub mod stdio;
pub mod streamable_http;

pub use stdio::boot_stdio_server;
pub use streamable_http::boot_streamable_http_server;
