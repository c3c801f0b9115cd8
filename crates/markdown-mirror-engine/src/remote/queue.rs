use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::models::Block;

use super::{PageId, RemoteClient, RemoteError, RemotePage};

/// Serialises every call to the wrapped client through one FIFO queue.
///
/// Callers queue on a fair mutex. The holder waits until `min_interval` has
/// passed since the previous request started, then performs its request while
/// still holding the lock, so only one request is ever in flight.
#[derive(Debug)]
pub struct RequestQueue<R> {
    inner: R,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl<R> RequestQueue<R> {
    pub fn new(inner: R, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Spacing derived from a requests-per-second budget.
    pub fn per_second(inner: R, requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self::new(inner, interval)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn slot(&self) -> MutexGuard<'_, Option<Instant>> {
        let mut guard = self.last_request.lock().await;
        if let Some(previous) = *guard {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *guard = Some(Instant::now());
        guard
    }
}

#[async_trait]
impl<R: RemoteClient> RemoteClient for RequestQueue<R> {
    async fn create_container_page(
        &self,
        parent: Option<&PageId>,
        title: &str,
        description: Option<&str>,
    ) -> Result<PageId, RemoteError> {
        let _slot = self.slot().await;
        self.inner
            .create_container_page(parent, title, description)
            .await
    }

    async fn create_content_page(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<PageId, RemoteError> {
        let _slot = self.slot().await;
        self.inner.create_content_page(parent, title).await
    }

    async fn retrieve_page(&self, id: &PageId) -> Result<RemotePage, RemoteError> {
        let _slot = self.slot().await;
        self.inner.retrieve_page(id).await
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), RemoteError> {
        let _slot = self.slot().await;
        self.inner.archive_page(id).await
    }

    async fn append_blocks(&self, page: &PageId, blocks: &[Block]) -> Result<(), RemoteError> {
        let _slot = self.slot().await;
        self.inner.append_blocks(page, blocks).await
    }

    async fn search_page_by_title(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<Option<PageId>, RemoteError> {
        let _slot = self.slot().await;
        self.inner.search_page_by_title(parent, title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;

    #[tokio::test(start_paused = true)]
    async fn requests_are_spaced() {
        let queue = RequestQueue::new(MemoryRemote::new(), Duration::from_millis(300));
        let start = Instant::now();

        let root = queue.create_container_page(None, "Root", None).await.unwrap();
        queue.retrieve_page(&root).await.unwrap();
        queue.retrieve_page(&root).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(600));
        assert_eq!(queue.inner().calls().retrieve, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let queue = RequestQueue::new(MemoryRemote::new(), Duration::from_secs(5));
        let start = Instant::now();
        queue.create_container_page(None, "Root", None).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn per_second_interval() {
        let queue = RequestQueue::per_second(MemoryRemote::new(), 4.0);
        assert_eq!(queue.min_interval(), Duration::from_millis(250));
        let unlimited = RequestQueue::per_second(MemoryRemote::new(), 0.0);
        assert_eq!(unlimited.min_interval(), Duration::ZERO);
    }
}
