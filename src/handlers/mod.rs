// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session cookie + identity match)
pub mod public;    // Listings, cart writes, session issue/clear
pub mod protected; // Identity-scoped reads behind the access gate
