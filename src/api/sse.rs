use std::convert::Infallible;

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc;

use crate::data_models::Frame;

/// Turn relay frames into `data: <json>` events, ending after the terminal frame
/// or when the producer closes.
///
/// A frame that fails to encode is replaced by an error frame and the stream ends.
pub fn frame_events(rx: mpsc::Receiver<Frame>) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(Some(rx), |state| async move {
        let mut rx = state?;
        let frame = rx.recv().await?;
        match Event::default().json_data(&frame) {
            Ok(event) => {
                let next = if frame.is_terminal() { None } else { Some(rx) };
                Some((Ok::<_, Infallible>(event), next))
            }
            Err(e) => {
                tracing::error!("failed to encode frame: {:#}", e);
                let fallback = serde_json::json!({ "error": e.to_string() }).to_string();
                Some((Ok(Event::default().data(fallback)), None))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::{ResultItem, SearchHit};
    use futures::StreamExt;

    fn item(n: usize) -> ResultItem {
        ResultItem::from(SearchHit::new(
            &format!("Result {n}"),
            &format!("https://example.com/{n}"),
            "s",
        ))
    }

    #[tokio::test]
    async fn test_stream_ends_after_terminal_frame() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Frame::item(item(1), false)).await.unwrap();
        tx.send(Frame::item(item(2), true)).await.unwrap();
        tx.send(Frame::item(item(3), false)).await.unwrap();

        // The sender stays alive, so only the terminal frame can end the stream.
        let events: Vec<_> = frame_events(rx).collect().await;
        assert_eq!(events.len(), 2);
        drop(tx);
    }

    #[tokio::test]
    async fn test_error_frame_is_terminal() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Frame::error("boom")).await.unwrap();
        tx.send(Frame::item(item(1), true)).await.unwrap();

        let events: Vec<_> = frame_events(rx).collect().await;
        assert_eq!(events.len(), 1);
        drop(tx);
    }
}
