use super::{PlayTrigger, PlaybackEngine, PlaybackFailure};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct FakeTransport {
    bound: Option<String>,
    playing: bool,
    stops: usize,
}

/// Engine that fails the sources it is told to and otherwise always succeeds.
#[derive(Default)]
pub(crate) struct FakeEngine {
    load_failures: HashMap<String, PlaybackFailure>,
    block_programmatic: bool,
    transport: Mutex<FakeTransport>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_source(mut self, source: &str, failure: PlaybackFailure) -> Self {
        self.load_failures.insert(source.to_string(), failure);
        self
    }

    pub fn blocking_programmatic(mut self) -> Self {
        self.block_programmatic = true;
        self
    }

    pub async fn bound(&self) -> Option<String> {
        self.transport.lock().await.bound.clone()
    }

    pub async fn is_playing(&self) -> bool {
        self.transport.lock().await.playing
    }

    pub async fn stop_count(&self) -> usize {
        self.transport.lock().await.stops
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    async fn load(&self, source: &str) -> Result<(), PlaybackFailure> {
        let mut transport = self.transport.lock().await;
        transport.playing = false;
        if let Some(failure) = self.load_failures.get(source) {
            transport.bound = None;
            return Err(failure.clone());
        }
        transport.bound = Some(source.to_string());
        Ok(())
    }

    async fn play(&self, trigger: PlayTrigger) -> Result<(), PlaybackFailure> {
        if self.block_programmatic && trigger == PlayTrigger::Programmatic {
            return Err(PlaybackFailure::Blocked("autoplay denied".to_string()));
        }
        self.transport.lock().await.playing = true;
        Ok(())
    }

    async fn pause(&self) {
        self.transport.lock().await.playing = false;
    }

    async fn stop(&self) {
        let mut transport = self.transport.lock().await;
        transport.bound = None;
        transport.playing = false;
        transport.stops += 1;
    }
}
