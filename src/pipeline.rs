//! Two-stage load pipeline: fetch bytes, decode them into audio.
//!
//! The pipeline owns the load lifecycle state and a generation counter.
//! Restarting with a new source cancels the in-flight load and bumps the
//! generation; results of superseded loads are discarded when they
//! eventually resolve, so a stale response can never overwrite newer state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{decode_bytes, DecodedAudio};
use crate::fetch::{
    cancel_pair, fetch_bytes, read_file, transition, CancelHandle, CancelSignal, FetchError,
    LoadEvent, LoadState,
};

/// Where the audio bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// Classifies a raw CLI argument: anything with an http(s) scheme is a
    /// URL, everything else a local path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    /// File extension used as a decoder format hint, if one is present.
    pub fn extension_hint(&self) -> Option<String> {
        match self {
            Self::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase()),
            Self::Url(url) => {
                // Last path segment before any query or fragment.
                let trimmed = url.split(['?', '#']).next().unwrap_or(url);
                let segment = trimmed.rsplit('/').next()?;
                let (_, ext) = segment.rsplit_once('.')?;
                let ext = ext.to_ascii_lowercase();
                if !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())
                {
                    Some(ext)
                } else {
                    None
                }
            }
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Drives fetch and decode for one source at a time.
pub struct AudioPipeline {
    client: reqwest::Client,
    timeout: Duration,
    generation: u64,
    cancel: Option<CancelHandle>,
    state: LoadState<Arc<DecodedAudio>>,
}

impl AudioPipeline {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            generation: 0,
            cancel: None,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState<Arc<DecodedAudio>> {
        &self.state
    }

    /// Handle to abort the current load, if one is in flight.
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.cancel.clone()
    }

    /// Begins a new load generation.
    ///
    /// Any in-flight load is cancelled; its eventual result will carry a
    /// stale generation and be discarded by [`apply`](Self::apply). The
    /// state moves to `Loading`.
    pub fn restart(&mut self) -> (u64, CancelSignal) {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }

        self.generation += 1;
        let (handle, signal) = cancel_pair();
        self.cancel = Some(handle);

        let current = std::mem::replace(&mut self.state, LoadState::Idle);
        self.state = transition(current, LoadEvent::Started);

        (self.generation, signal)
    }

    /// Applies a load event, discarding events from superseded generations.
    pub fn apply(&mut self, generation: u64, event: LoadEvent<Arc<DecodedAudio>>) {
        if generation != self.generation {
            tracing::debug!(
                "Discarding stale load event (generation {generation}, current {})",
                self.generation
            );
            return;
        }

        if !matches!(&event, LoadEvent::Cancelled) {
            self.cancel = None;
        }

        let current = std::mem::replace(&mut self.state, LoadState::Idle);
        self.state = transition(current, event);
    }

    /// Runs both stages for a generation obtained from [`restart`](Self::restart)
    /// and applies the outcome.
    pub async fn run(
        &mut self,
        generation: u64,
        source: &Source,
        mut signal: CancelSignal,
    ) -> &LoadState<Arc<DecodedAudio>> {
        let event = match self.run_stages(source, &mut signal).await {
            Ok(audio) => LoadEvent::Finished(Arc::new(audio)),
            Err(StageError::Cancelled) => {
                tracing::info!("Load of {source} cancelled");
                LoadEvent::Cancelled
            }
            Err(StageError::Failed(message)) => {
                tracing::error!("Load of {source} failed: {message}");
                LoadEvent::Failed(message)
            }
        };

        self.apply(generation, event);
        self.state()
    }

    /// Convenience wrapper: restart and run to completion.
    pub async fn load(&mut self, source: &Source) -> &LoadState<Arc<DecodedAudio>> {
        let (generation, signal) = self.restart();
        self.run(generation, source, signal).await
    }

    async fn run_stages(
        &self,
        source: &Source,
        signal: &mut CancelSignal,
    ) -> Result<DecodedAudio, StageError> {
        // Stage 1: bytes.
        let bytes = match source {
            Source::Url(url) => fetch_bytes(&self.client, url, self.timeout, signal).await?,
            Source::File(path) => read_file(path, signal).await?,
        };

        // Stage 2: decode. CPU-bound, so it runs on the blocking pool while
        // this task keeps watching the cancel signal.
        let hint = source.extension_hint();
        let decode_task =
            tokio::task::spawn_blocking(move || decode_bytes(bytes, hint.as_deref()));

        tokio::select! {
            _ = signal.cancelled() => Err(StageError::Cancelled),
            joined = decode_task => match joined {
                Ok(Ok(audio)) => Ok(audio),
                Ok(Err(e)) => Err(StageError::Failed(format!("Failed to decode audio: {e}"))),
                Err(e) => Err(StageError::Failed(format!("Decoder task failed: {e}"))),
            },
        }
    }
}

/// Internal stage outcome, keeping cancellation apart from real failures.
enum StageError {
    Cancelled,
    Failed(String),
}

impl From<FetchError> for StageError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_fixture(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("clip.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..44_100 {
            let value = if (i / 100) % 2 == 0 { 8_192i16 } else { -8_192 };
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.com/a.mp3"),
            Source::Url("https://example.com/a.mp3".into())
        );
        assert_eq!(
            Source::parse("clips/a.wav"),
            Source::File(PathBuf::from("clips/a.wav"))
        );
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(
            Source::parse("https://example.com/audio/clip.MP3?token=abc").extension_hint(),
            Some("mp3".into())
        );
        assert_eq!(
            Source::parse("https://example.com/stream").extension_hint(),
            None
        );
        assert_eq!(
            Source::parse("music/clip.FLAC").extension_hint(),
            Some("flac".into())
        );
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut pipeline = AudioPipeline::new(Duration::from_secs(5));

        let (first, _signal_a) = pipeline.restart();
        let (second, _signal_b) = pipeline.restart();

        pipeline.apply(first, LoadEvent::Failed("stale failure".into()));
        assert!(pipeline.state().is_loading(), "stale event must be ignored");

        pipeline.apply(second, LoadEvent::Failed("current failure".into()));
        assert_eq!(
            pipeline.state(),
            &LoadState::Failed("current failure".into())
        );
    }

    #[test]
    fn test_cancelled_event_keeps_state() {
        let mut pipeline = AudioPipeline::new(Duration::from_secs(5));
        let (generation, _signal) = pipeline.restart();

        pipeline.apply(generation, LoadEvent::Cancelled);
        assert!(pipeline.state().is_loading());
    }

    #[test]
    fn test_restart_cancels_previous_load() {
        let mut pipeline = AudioPipeline::new(Duration::from_secs(5));

        let (_first, signal_a) = pipeline.restart();
        let handle_a = pipeline.cancel_handle().unwrap();
        let (_second, signal_b) = pipeline.restart();

        assert!(handle_a.is_cancelled());
        assert!(signal_a.is_cancelled());
        assert!(!signal_b.is_cancelled());
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_fixture(dir.path());

        let mut pipeline = AudioPipeline::new(Duration::from_secs(5));
        let state = pipeline.load(&Source::File(path)).await;

        let audio = state.loaded().expect("load should succeed");
        assert_eq!(audio.sample_rate(), 44_100);
        assert_eq!(audio.frames(), 44_100);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");

        let mut pipeline = AudioPipeline::new(Duration::from_secs(5));
        let state = pipeline.load(&Source::File(path)).await;

        assert!(matches!(state, LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_external_cancel_leaves_loading_state() {
        // A server that accepts and then stays silent, so the fetch stage
        // hangs until the cancel fires.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let _socket = socket;
                    std::future::pending::<()>().await;
                });
            }
        });

        let mut pipeline = AudioPipeline::new(Duration::from_secs(30));
        let (generation, signal) = pipeline.restart();
        let handle = pipeline.cancel_handle().unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let source = Source::Url(format!("http://{addr}/clip.mp3"));
        let state = pipeline.run(generation, &source, signal).await;

        assert!(state.is_loading(), "cancellation must not report an error");
    }
}
