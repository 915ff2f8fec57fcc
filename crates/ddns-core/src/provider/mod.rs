// # Built-in Providers
//
// Provider implementations that ship with the core. Network-backed
// providers live in their own crates (e.g., `ddns-provider-dnsimple`).

pub mod memory;

pub use memory::{MemoryZoneFactory, MemoryZoneProvider};
