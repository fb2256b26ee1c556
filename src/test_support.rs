use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::modules::remote::{
    CountedRows, Filter, RemoteError, StorageClient, TableClient, TableQuery,
};

/// One recorded call against the mock table client, for assertions on what a
/// service actually sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    Select(TableQuery),
    SelectCounted(TableQuery),
    Insert {
        table: String,
        rows: Vec<Value>,
    },
    Update {
        table: String,
        patch: Value,
        filters: Vec<Filter>,
    },
    Upsert {
        table: String,
        rows: Vec<Value>,
        on_conflict: String,
    },
    Delete {
        table: String,
        filters: Vec<Filter>,
    },
}

/// Hand-rolled `TableClient` double: canned results are consumed in FIFO
/// order per call family; an exhausted queue yields the empty-success
/// default (no rows / ok).
#[derive(Default)]
pub struct MockTableClient {
    calls: Mutex<Vec<ClientCall>>,
    select_results: Mutex<VecDeque<Result<Vec<Value>, RemoteError>>>,
    counted_results: Mutex<VecDeque<Result<CountedRows, RemoteError>>>,
    write_results: Mutex<VecDeque<Result<Vec<Value>, RemoteError>>>,
    delete_results: Mutex<VecDeque<Result<(), RemoteError>>>,
}

impl MockTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_select(self, rows: Vec<Value>) -> Self {
        self.select_results.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fail_select(self, message: &str) -> Self {
        self.select_results
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Network(message.to_string())));
        self
    }

    pub fn on_counted(self, rows: Vec<Value>, total: u64) -> Self {
        self.counted_results
            .lock()
            .unwrap()
            .push_back(Ok(CountedRows { rows, total }));
        self
    }

    pub fn fail_counted(self, message: &str) -> Self {
        self.counted_results
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Network(message.to_string())));
        self
    }

    /// Queues a result for the next insert, update or upsert.
    pub fn on_write(self, rows: Vec<Value>) -> Self {
        self.write_results.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fail_write(self, message: &str) -> Self {
        self.write_results
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Network(message.to_string())));
        self
    }

    pub fn fail_delete(self, message: &str) -> Self {
        self.delete_results
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Network(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ClientCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TableClient for MockTableClient {
    async fn select(&self, query: TableQuery) -> Result<Vec<Value>, RemoteError> {
        self.record(ClientCall::Select(query));
        self.select_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn select_counted(&self, query: TableQuery) -> Result<CountedRows, RemoteError> {
        self.record(ClientCall::SelectCounted(query));
        self.counted_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CountedRows {
                    rows: Vec::new(),
                    total: 0,
                })
            })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RemoteError> {
        self.record(ClientCall::Insert {
            table: table.to_string(),
            rows,
        });
        self.write_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: Vec<Filter>,
    ) -> Result<Vec<Value>, RemoteError> {
        self.record(ClientCall::Update {
            table: table.to_string(),
            patch,
            filters,
        });
        self.write_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, RemoteError> {
        self.record(ClientCall::Upsert {
            table: table.to_string(),
            rows,
            on_conflict: on_conflict.to_string(),
        });
        self.write_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<(), RemoteError> {
        self.record(ClientCall::Delete {
            table: table.to_string(),
            filters,
        });
        self.delete_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(()))
    }
}

/// `StorageClient` double mirroring the hosted backend's URL convention.
#[derive(Default)]
pub struct MockStorage {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub removed: Mutex<Vec<(String, Vec<String>)>>,
    fail_uploads: bool,
    fail_removes: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn failing_removes() -> Self {
        Self {
            fail_removes: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl StorageClient for MockStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, RemoteError> {
        if self.fail_uploads {
            return Err(RemoteError::Backend {
                status: 403,
                message: "upload rejected".to_string(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), path.to_string(), bytes.len()));
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "https://example.supabase.co/storage/v1/object/public/{}/{}",
            bucket, path
        )
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), RemoteError> {
        if self.fail_removes {
            return Err(RemoteError::Backend {
                status: 500,
                message: "remove failed".to_string(),
            });
        }
        self.removed
            .lock()
            .unwrap()
            .push((bucket.to_string(), paths.to_vec()));
        Ok(())
    }
}
