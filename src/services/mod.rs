// Service exports
pub mod catalog;
pub mod rate_limit;
pub mod supabase;

pub use catalog::{CatalogError, ResortSource, ResortSourceError, StaticCatalog};
pub use rate_limit::{CounterConnection, KeyExpiryStore, MemoryStore, RateDecision, RateLimitKey, RateLimiter, RedisStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseError};
