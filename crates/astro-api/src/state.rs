//! Application state management
//!
//! Author: hephaex@gmail.com

use astro_core::config::AppConfig;
use astro_core::CompletionClient;
use astro_guide::{AnswerGenerator, GeneratorConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Answer generator wrapping the completion client
    pub generator: AnswerGenerator,
}

impl AppState {
    /// Create new application state with config and a completion client
    pub fn new(config: AppConfig, client: Arc<dyn CompletionClient>) -> Self {
        let generator = AnswerGenerator::new(client, GeneratorConfig::from(&config));

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            generator,
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
