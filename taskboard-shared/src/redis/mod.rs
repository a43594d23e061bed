/// Redis integration
///
/// Redis is optional. When configured it carries realtime frames between API
/// instances over pub/sub (see [`crate::realtime::relay`]):
///
/// ```text
/// ┌────────────┐  PUBLISH taskboard:project:{id}  ┌────────────┐
/// │ API node A │ ───────────────────────────────> │   Redis    │
/// └────────────┘                                  └────────────┘
///                                                        │ PSUBSCRIBE taskboard:project:*
///                                                        ▼
///                                                 ┌────────────┐
///                                                 │ API node B │ ──> local subscribers
///                                                 └────────────┘
/// ```

pub mod client;

pub use client::{sanitize_url, RedisClient, RedisClientError, RedisConfig};
