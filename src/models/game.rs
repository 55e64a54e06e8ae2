//! Game state model - the GPUI entity around a game session.
//!
//! Every UI event becomes one session call here. Searches run on the
//! background executor; their results come back through `finish_ai`.

use std::time::Duration;

use gpui::{AsyncApp, Context, Pixels, Size, Task, WeakEntity, px};

use crate::domain::scheduler::AiCompletion;
use crate::domain::session::{Phase, Selection};
use crate::domain::uci::UciInfo;
use crate::domain::{
    AiConfig, BoardSnapshot, History, MoveOutcome, MovePair, RollbackOutcome, SearchParams,
    Session, SessionError, Status, to_square,
};
use crate::engine::{ShakmatyFactory, ShakmatyGame};
use crate::ui::BoardLayout;
use crate::ui::theme::INITIAL_LEFT_PANEL;

/// What the last finished search looked like
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub engine: String,
    pub elapsed: Duration,
    /// Principal variations, best first (empty for engines without analysis)
    pub lines: Vec<UciInfo>,
}

/// The main game model
pub struct GameModel {
    session: Session<ShakmatyFactory>,
    /// Measured panel size from canvas
    pub panel_size: Size<Pixels>,
    last_search: Option<SearchReport>,
    /// Last error not already reflected in the status line
    error: Option<String>,
    /// The running search, if any
    _ai_task: Option<Task<()>>,
}

impl GameModel {
    pub fn new(session: Session<ShakmatyFactory>) -> Self {
        Self {
            session,
            panel_size: Size {
                width: px(INITIAL_LEFT_PANEL),
                height: px(600.0),
            },
            last_search: None,
            error: None,
            _ai_task: None,
        }
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout::new(self.panel_size)
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        self.session.current_snapshot()
    }

    pub fn history(&self) -> &History {
        self.session.history()
    }

    pub fn current_ply(&self) -> usize {
        self.session.current_ply()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.session.selection()
    }

    pub fn last_move(&self) -> Option<MovePair> {
        self.session.last_move()
    }

    pub fn status(&self) -> &Status {
        self.session.status()
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self.session.phase(), Phase::Queued | Phase::Searching)
    }

    pub fn ai_config(&self) -> &AiConfig {
        self.session.ai_config()
    }

    pub fn engine_name(&self) -> &str {
        self.session.factory().searcher().name()
    }

    pub fn last_search(&self) -> Option<&SearchReport> {
        self.last_search.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The engine failed and can be asked again
    pub fn can_retry(&self) -> bool {
        matches!(self.session.status(), Status::EngineFailed(_)) && !self.is_thinking()
    }

    /// Handle a click on the board square at `row`/`col`
    pub fn click_square(&mut self, row: usize, col: usize, cx: &mut Context<Self>) {
        let square = to_square(row, col);
        match self.session.attempt_move(square) {
            Ok(MoveOutcome::Ignored) => return,
            Ok(MoveOutcome::Moved { ai_queued: true }) => {
                self.error = None;
                self.drive_ai(cx);
            }
            Ok(_) => self.error = None,
            Err(e) => self.report(e),
        }
        cx.notify();
    }

    /// Restore the position at `ply`
    pub fn rollback(&mut self, ply: usize, cx: &mut Context<Self>) {
        let outcome = self.session.rollback(ply);
        self.after_rollback(outcome, cx);
    }

    pub fn step_back(&mut self, cx: &mut Context<Self>) {
        let outcome = self.session.step_back();
        self.after_rollback(outcome, cx);
    }

    pub fn step_forward(&mut self, cx: &mut Context<Self>) {
        let outcome = self.session.step_forward();
        self.after_rollback(outcome, cx);
    }

    pub fn go_to_start(&mut self, cx: &mut Context<Self>) {
        let outcome = self.session.rollback_to_start();
        self.after_rollback(outcome, cx);
    }

    pub fn go_to_end(&mut self, cx: &mut Context<Self>) {
        let outcome = self.session.rollback_to_end();
        self.after_rollback(outcome, cx);
    }

    fn after_rollback(
        &mut self,
        outcome: Result<RollbackOutcome, SessionError>,
        cx: &mut Context<Self>,
    ) {
        match outcome {
            Ok(RollbackOutcome::Ignored) => return,
            Ok(RollbackOutcome::Restored { ai_queued }) => {
                self.error = None;
                if ai_queued {
                    self.drive_ai(cx);
                }
            }
            Err(e) => self.report(e),
        }
        cx.notify();
    }

    /// Start over from the start position
    pub fn new_game(&mut self, cx: &mut Context<Self>) {
        match self.session.reset() {
            Ok(()) => {
                // a search still running belongs to the old game
                self._ai_task = None;
                self.last_search = None;
                self.error = None;
            }
            Err(e) => self.report(e),
        }
        cx.notify();
    }

    pub fn set_ai_config(&mut self, config: AiConfig, cx: &mut Context<Self>) {
        match self.session.set_ai_config(config) {
            Ok(()) => self.error = None,
            Err(e) => {
                tracing::warn!(error = %e, "rejected AI configuration");
                self.error = Some(e.to_string());
            }
        }
        cx.notify();
    }

    /// Switch to custom parameters derived from the current ones
    pub fn adjust_params(&mut self, adjust: impl FnOnce(&mut SearchParams), cx: &mut Context<Self>) {
        let mut params = self.session.ai_config().params();
        adjust(&mut params);
        // steppers stop at the range limits
        if let Ok(config) = AiConfig::custom(params) {
            self.set_ai_config(config, cx);
        }
    }

    /// Ask the engine again after a failed search
    pub fn retry_ai(&mut self, cx: &mut Context<Self>) {
        if self.session.resume_ai() {
            self.error = None;
            self.drive_ai(cx);
            cx.notify();
        }
    }

    /// Hand the queued search to the background executor
    fn drive_ai(&mut self, cx: &mut Context<Self>) {
        let Some(job) = self.session.take_ai_job() else {
            return;
        };
        tracing::debug!(
            generation = job.generation(),
            ply = job.prefix_ply(),
            ai = %job.config(),
            "dispatching search"
        );

        let task = cx.spawn(async move |weak: WeakEntity<GameModel>, cx: &mut AsyncApp| {
            let completion = cx
                .background_executor()
                .spawn(async move { job.run() })
                .await;
            let _ = weak.update(cx, |game, cx| {
                game.finish_ai(completion);
                cx.notify();
            });
        });
        self._ai_task = Some(task);
    }

    fn finish_ai(&mut self, completion: AiCompletion<ShakmatyGame>) {
        let elapsed = completion.elapsed();
        match self.session.complete_ai(completion) {
            Ok(true) => {
                let searcher = self.session.factory().searcher();
                self.last_search = Some(SearchReport {
                    engine: searcher.name().to_string(),
                    elapsed,
                    lines: searcher.last_analysis(),
                });
            }
            Ok(false) => {}
            // already shown as the engine-failed status
            Err(SessionError::Facade(_)) => {}
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, error: SessionError) {
        tracing::error!(error = %error, "game operation failed");
        self.error = Some(error.to_string());
    }
}
