pub(crate) mod http;
pub mod ports;
pub mod postgrest;
pub mod query;
pub mod storage;

pub use ports::{decode_row, decode_rows, CountedRows, RemoteError, StorageClient, TableClient};
pub use postgrest::PostgrestClient;
pub use query::{Filter, OrderBy, TableQuery};
pub use storage::SupabaseStorage;
