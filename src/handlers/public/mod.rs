// handlers/public/mod.rs - Public handlers (no session required)
//
// Security Level: None
// Middleware: CORS + request tracing only

pub mod cart;
pub mod foods;
pub mod session;
pub mod system;
