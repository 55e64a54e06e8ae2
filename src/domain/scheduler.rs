//! Two-phase AI invocation.
//!
//! The session first enters the queued phase so the UI can show that the
//! engine is thinking. The driver then takes an [`AiJob`], which owns the live
//! game for the duration of the search, runs it (inline or on a background
//! executor) and hands the [`AiCompletion`] back to the session.

use std::time::{Duration, Instant};

use crate::domain::ai_config::AiConfig;
use crate::domain::facade::{AiReply, FacadeError, LiveGame};

/// One search, detached from the session while it runs
pub struct AiJob<G: LiveGame> {
    game: G,
    config: AiConfig,
    prefix_ply: usize,
    generation: u64,
}

impl<G: LiveGame> AiJob<G> {
    pub(crate) fn new(game: G, config: AiConfig, prefix_ply: usize, generation: u64) -> Self {
        Self {
            game,
            config,
            prefix_ply,
            generation,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Last history ply kept when the reply is recorded
    pub fn prefix_ply(&self) -> usize {
        self.prefix_ply
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Perform the blocking search
    pub fn run(mut self) -> AiCompletion<G> {
        let started = Instant::now();
        tracing::debug!(config = %self.config, ply = self.prefix_ply, "search started");
        let result = self.game.run_ai(&self.config);
        let elapsed = started.elapsed();
        match &result {
            Ok(reply) => tracing::debug!(
                mv = %reply.played.pair,
                elapsed_ms = elapsed.as_millis() as u64,
                "search finished"
            ),
            Err(e) => tracing::warn!(error = %e, "search failed"),
        }
        AiCompletion {
            game: self.game,
            prefix_ply: self.prefix_ply,
            generation: self.generation,
            elapsed,
            result,
        }
    }
}

/// The outcome of an [`AiJob`], carrying the live game back
pub struct AiCompletion<G: LiveGame> {
    pub(crate) game: G,
    pub(crate) prefix_ply: usize,
    pub(crate) generation: u64,
    pub(crate) elapsed: Duration,
    pub(crate) result: Result<AiReply, FacadeError>,
}

impl<G: LiveGame> AiCompletion<G> {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
