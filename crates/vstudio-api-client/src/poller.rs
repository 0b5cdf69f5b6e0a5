//! Background status polling for videos in a transient state.
//!
//! While a video is `captioning` or `publishing` its record is re-fetched on a
//! fixed interval. Each fetch is delivered as a [`PollEvent`]; polling stops
//! after the first snapshot outside those states, or as soon as the
//! [`PollHandle`] is cancelled or dropped. Fetch failures are reported and
//! polling continues.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use vstudio_core::models::{Video, VideoId};

use crate::error::{ClientError, Result};
use crate::ApiClient;

const UPDATE_BUFFER: usize = 16;

/// Anything that can fetch the current state of a video.
#[async_trait]
pub trait VideoSource: Send + Sync + 'static {
    async fn fetch_video(&self, video_id: &VideoId) -> Result<Video>;
}

#[async_trait]
impl VideoSource for ApiClient {
    async fn fetch_video(&self, video_id: &VideoId) -> Result<Video> {
        self.get_video(video_id).await
    }
}

#[derive(Debug)]
pub enum PollEvent {
    /// Latest server state. The last snapshot is the one whose status stopped polling.
    Snapshot(Video),
    FetchFailed(ClientError),
}

/// Receiving end of a polling task. Dropping it stops the task.
#[derive(Debug)]
pub struct PollHandle {
    updates: mpsc::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Next event, or `None` once polling has stopped.
    pub async fn next(&mut self) -> Option<PollEvent> {
        self.updates.recv().await
    }

    pub fn cancel(&mut self) {
        self.task.abort();
        self.updates.close();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `video_id` every `period`. The first fetch happens one period from now.
pub fn watch<S: VideoSource>(source: Arc<S>, video_id: VideoId, period: Duration) -> PollHandle {
    let (tx, rx) = mpsc::channel(UPDATE_BUFFER);

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(video_id = %video_id, period_ms = period.as_millis() as u64, "Polling started");

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!(video_id = %video_id, "Poll receiver dropped");
                    break;
                }
                _ = ticker.tick() => {
                    let event = match source.fetch_video(&video_id).await {
                        Ok(video) => video,
                        Err(err) => {
                            tracing::warn!(video_id = %video_id, error = %err, "Status poll failed");
                            if tx.send(PollEvent::FetchFailed(err)).await.is_err() {
                                break;
                            }
                            continue;
                        }
                    };

                    let still_polling = event.status.is_polling();
                    tracing::debug!(video_id = %video_id, status = %event.status, "Status polled");
                    if tx.send(PollEvent::Snapshot(event)).await.is_err() || !still_polling {
                        break;
                    }
                }
            }
        }

        tracing::debug!(video_id = %video_id, "Polling stopped");
    });

    PollHandle { updates: rx, task }
}

/// Start polling only when `video` is in a transient state.
pub fn watch_if_polling<S: VideoSource>(
    source: Arc<S>,
    video: &Video,
    period: Duration,
) -> Option<PollHandle> {
    video
        .status
        .is_polling()
        .then(|| watch(source, video.id.clone(), period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use vstudio_core::VideoStatus;

    struct ScriptedSource {
        script: Mutex<VecDeque<Result<VideoStatus>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<VideoStatus>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn video(status: VideoStatus) -> Video {
        serde_json::from_value(serde_json::json!({
            "id": 42,
            "original_filename": "demo.mp4",
            "status": status.as_str(),
        }))
        .unwrap()
    }

    #[async_trait]
    impl VideoSource for ScriptedSource {
        async fn fetch_video(&self, _video_id: &VideoId) -> Result<Video> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(VideoStatus::Captioning));
            next.map(video)
        }
    }

    fn status_of(event: PollEvent) -> VideoStatus {
        match event {
            PollEvent::Snapshot(v) => v.status,
            PollEvent::FetchFailed(err) => panic!("unexpected failure: {err}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_once_status_settles() {
        let source = ScriptedSource::new(vec![
            Ok(VideoStatus::Captioning),
            Ok(VideoStatus::Captioning),
            Ok(VideoStatus::MetadataReady),
        ]);
        let mut handle = watch(source.clone(), VideoId::Numeric(42), Duration::from_secs(3));

        assert_eq!(status_of(handle.next().await.unwrap()), VideoStatus::Captioning);
        assert_eq!(status_of(handle.next().await.unwrap()), VideoStatus::Captioning);
        assert_eq!(status_of(handle.next().await.unwrap()), VideoStatus::MetadataReady);
        assert!(handle.next().await.is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_waits_one_interval() {
        let source = ScriptedSource::new(vec![Ok(VideoStatus::Published)]);
        let _handle = watch(source.clone(), VideoId::Numeric(42), Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(source.calls(), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_and_polling_continues() {
        let source = ScriptedSource::new(vec![
            Err(ClientError::Api {
                status: 503,
                message: "busy".to_string(),
            }),
            Ok(VideoStatus::Published),
        ]);
        let mut handle = watch(source, VideoId::Numeric(42), Duration::from_secs(3));

        match handle.next().await.unwrap() {
            PollEvent::FetchFailed(err) => assert_eq!(err.status(), Some(503)),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(status_of(handle.next().await.unwrap()), VideoStatus::Published);
        assert!(handle.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_fetches() {
        let source = ScriptedSource::new(vec![]);
        let mut handle = watch(source.clone(), VideoId::Numeric(42), Duration::from_secs(3));
        handle.next().await.unwrap();
        drop(handle);

        let seen = source.calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_ends_the_stream() {
        let source = ScriptedSource::new(vec![]);
        let mut handle = watch(source, VideoId::Numeric(42), Duration::from_secs(3));
        handle.cancel();
        assert!(handle.next().await.is_none());
    }

    #[tokio::test]
    async fn settled_videos_are_not_watched() {
        let source = ScriptedSource::new(vec![]);
        let period = Duration::from_secs(3);
        assert!(watch_if_polling(source.clone(), &video(VideoStatus::Ready), period).is_none());
        assert!(watch_if_polling(source.clone(), &video(VideoStatus::Error), period).is_none());
        assert!(watch_if_polling(source, &video(VideoStatus::Publishing), period).is_some());
    }
}
