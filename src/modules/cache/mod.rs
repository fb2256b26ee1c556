pub mod key;
pub mod query_cache;

pub use key::{KeyPart, QueryKey};
pub use query_cache::{QueryCache, QueryCacheConfig, QuerySnapshot};
