use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

use actors::{Coordinator, CoordinatorConfig, start_coordinator};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    CopyOptions, GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta, ObjectStore,
    PutMultipartOptions, PutOptions, PutPayload, PutResult,
};
use storage::{ListStore, Storage, StorageConfig};
use tokio::task::JoinHandle;

pub async fn memory_store() -> Result<ListStore, Box<dyn Error>> {
    Ok(ListStore::new(Storage::new(StorageConfig::memory()).await?))
}

pub async fn start(store: ListStore) -> Result<(Coordinator, JoinHandle<()>), Box<dyn Error>> {
    Ok(start_coordinator(store, CoordinatorConfig::default()).await?)
}

pub async fn stop(coordinator: Coordinator, handle: JoinHandle<()>) -> Result<(), Box<dyn Error>> {
    coordinator.shutdown();
    handle.await?;
    Ok(())
}

/// In-memory store that refuses writes to selected keys.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemory,
    refused: Mutex<HashSet<String>>,
}

impl FailingStore {
    /// A list store backed by a fresh `FailingStore`, plus a handle to it.
    pub fn list_store() -> (Arc<Self>, ListStore) {
        let store = Arc::new(Self::default());
        let list_store = ListStore::new(Storage::from_object_store(store.clone()));
        (store, list_store)
    }

    pub fn refuse_writes_to(&self, key: &str) {
        self.refused.lock().unwrap().insert(key.to_string());
    }

    fn check_write(&self, location: &Path) -> object_store::Result<()> {
        if self.refused.lock().unwrap().contains(location.as_ref()) {
            return Err(object_store::Error::Generic {
                store: "FailingStore",
                source: format!("write to {location} refused").into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for FailingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FailingStore({})", self.inner)
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put_opts(
        &self,
        location: &Path,
        payload: PutPayload,
        opts: PutOptions,
    ) -> object_store::Result<PutResult> {
        self.check_write(location)?;
        self.inner.put_opts(location, payload, opts).await
    }

    async fn put_multipart_opts(
        &self,
        location: &Path,
        opts: PutMultipartOptions,
    ) -> object_store::Result<Box<dyn MultipartUpload>> {
        self.check_write(location)?;
        self.inner.put_multipart_opts(location, opts).await
    }

    async fn get_opts(&self, location: &Path, options: GetOptions) -> object_store::Result<GetResult> {
        self.inner.get_opts(location, options).await
    }

    fn delete_stream(
        &self,
        locations: BoxStream<'static, object_store::Result<Path>>,
    ) -> BoxStream<'static, object_store::Result<Path>> {
        self.inner.delete_stream(locations)
    }

    fn list(&self, prefix: Option<&Path>) -> BoxStream<'static, object_store::Result<ObjectMeta>> {
        self.inner.list(prefix)
    }

    async fn list_with_delimiter(&self, prefix: Option<&Path>) -> object_store::Result<ListResult> {
        self.inner.list_with_delimiter(prefix).await
    }

    async fn copy_opts(&self, from: &Path, to: &Path, options: CopyOptions) -> object_store::Result<()> {
        self.inner.copy_opts(from, to, options).await
    }
}
