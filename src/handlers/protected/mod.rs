// handlers/protected/mod.rs - Protected handlers (session required)
//
// Security Level: valid `token` cookie whose owner matches `?email=`
// Middleware: session_auth_middleware → identity_match_middleware
//
// Handlers receive a `VerifiedIdentity` extension and must scope every
// query by it.

pub mod cart;
