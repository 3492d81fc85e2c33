use std::sync::Arc;
use std::time::Duration;

use nanoid::nanoid;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::{DEFAULT_PACING_MS, DEFAULT_RESULT_LIMIT};
use crate::data_models::{Frame, ResultItem};
use crate::search::{SearchError, SearchProvider};

/// Frames buffered between the producer task and the response body.
const FRAME_BUFFER: usize = 8;

/// Runs one upstream search per query and republishes the hits as paced frames.
pub struct ResultRelay<P> {
    provider: Arc<P>,
    limit: usize,
    pacing: Duration,
}

impl<P: SearchProvider> ResultRelay<P> {
    pub fn new(provider: Arc<P>, limit: usize, pacing: Duration) -> Self {
        Self {
            provider,
            limit,
            pacing,
        }
    }

    pub fn with_defaults(provider: Arc<P>) -> Self {
        Self::new(
            provider,
            DEFAULT_RESULT_LIMIT,
            Duration::from_millis(DEFAULT_PACING_MS),
        )
    }

    /// Spawn the producer and hand back the receiving end right away.
    ///
    /// The channel closes once the terminal frame has been sent. Dropping the
    /// receiver stops production at the next write or pacing wait.
    pub fn start(&self, query: String) -> mpsc::Receiver<Frame> {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let provider = self.provider.clone();
        let limit = self.limit;
        let pacing = self.pacing;

        let request_id = nanoid!(10);
        let span = tracing::info_span!("relay", %request_id);
        tokio::spawn(produce(provider, query, limit, pacing, tx).instrument(span));

        rx
    }

    /// Fetch and project every hit in one go, for callers that don't stream.
    pub async fn collect(&self, query: &str) -> Result<Vec<ResultItem>, SearchError> {
        let hits = self.provider.search(query, self.limit).await?;
        Ok(hits.into_iter().map(ResultItem::from).collect())
    }
}

async fn produce<P: SearchProvider>(
    provider: Arc<P>,
    query: String,
    limit: usize,
    pacing: Duration,
    tx: mpsc::Sender<Frame>,
) {
    tracing::info!(query = %query, "relaying search");

    let hits = match provider.search(&query, limit).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::error!("search collaborator failed: {:#}", e);
            let _ = tx.send(Frame::error(e.to_string())).await;
            return;
        }
    };

    if hits.is_empty() {
        tracing::info!("no results");
        let _ = tx.send(Frame::empty()).await;
        return;
    }

    let total = hits.len();
    for (i, hit) in hits.into_iter().enumerate() {
        let is_last = i + 1 == total;
        if tx.send(Frame::item(hit.into(), is_last)).await.is_err() {
            tracing::warn!(sent = i, total, "client went away, stopping relay");
            return;
        }
        if is_last {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(pacing) => {}
            _ = tx.closed() => {
                tracing::warn!(sent = i + 1, total, "client went away, stopping relay");
                return;
            }
        }
    }

    tracing::info!(total, "relay finished");
}
