use crate::report::{self, ReportSink, ScoreEntry};
use crate::scenario::{Catalog, Scenario};
use crate::scoring::{self, Choice};
use std::sync::Arc;

pub const TICK_RATE_MS: u64 = 100;

/// Where the game currently is. One phase at a time, one clock per concern;
/// changing phase abandons the clocks the new phase does not use, so a stale
/// countdown can never fire against the wrong question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Active,
    Feedback,
    GameOver,
}

/// Countdown tiers used by the question-timer gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTier {
    Fresh,
    Waning,
    Critical,
}

/// Timing knobs, all in milliseconds. Tuning these changes the difficulty,
/// nothing else depends on the exact values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub session_ms: u64,
    pub question_ms: u64,
    pub feedback_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_ms: 90_000,
            question_ms: 15_000,
            feedback_ms: 4_500,
        }
    }
}

/// What the feedback screen shows for the question just resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub choice: Choice,
    pub correct: bool,
    pub points_awarded: u32,
    pub explanation: String,
}

/// One complete play-through. Created on name submission, dropped on replay.
#[derive(Clone, Debug)]
pub struct Session {
    pub player_name: String,
    pub order: Vec<Scenario>,
    pub cursor: usize,
    pub score: u32,
    pub streak: u32,
    pub session_ms_remaining: u64,
    pub question_ms_remaining: u64,
    pub feedback_ms_remaining: u64,
    pub feedback: Option<Feedback>,
    reported: bool,
}

/// The state machine. Owns the session exclusively; all mutation goes
/// through `submit_name`, `submit_choice`, `on_tick` and `request_replay`.
pub struct Game {
    pub config: GameConfig,
    pub catalog: Catalog,
    pub phase: Phase,
    pub session: Option<Session>,
    pub name_entry: String,
    pub intro_error: Option<String>,
    reporter: Option<Arc<dyn ReportSink>>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("name_entry", &self.name_entry)
            .field("intro_error", &self.intro_error)
            .field("has_reporter", &self.reporter.is_some())
            .finish()
    }
}

impl Game {
    pub fn new(catalog: Catalog, config: GameConfig) -> Self {
        Self {
            config,
            catalog,
            phase: Phase::Intro,
            session: None,
            name_entry: String::new(),
            intro_error: None,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ReportSink>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    // --- intro ---

    pub fn push_name_char(&mut self, c: char) {
        if self.phase == Phase::Intro {
            self.name_entry.push(c);
            self.intro_error = None;
        }
    }

    pub fn pop_name_char(&mut self) {
        if self.phase == Phase::Intro {
            self.name_entry.pop();
        }
    }

    /// Intro -> Active. Rejects empty or whitespace-only names locally and
    /// stays in Intro with a validation message.
    pub fn submit_name(&mut self, name: &str) {
        if self.phase != Phase::Intro {
            return;
        }

        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.intro_error = Some("Please enter your name to start!".to_string());
            return;
        }

        self.intro_error = None;
        self.session = Some(Session {
            player_name: trimmed.to_string(),
            order: self.catalog.shuffled_deck(),
            cursor: 0,
            score: 0,
            streak: 0,
            session_ms_remaining: self.config.session_ms,
            question_ms_remaining: self.config.question_ms,
            feedback_ms_remaining: 0,
            feedback: None,
            reported: false,
        });
        self.begin_question();
    }

    /// Submit the name the player has typed so far.
    pub fn submit_entered_name(&mut self) {
        let name = self.name_entry.clone();
        self.submit_name(&name);
    }

    // --- active ---

    pub fn current_scenario(&self) -> Option<&Scenario> {
        let session = self.session.as_ref()?;
        session.order.get(session.cursor)
    }

    /// The scenario the feedback screen is explaining, i.e. the one just
    /// resolved. The cursor has already moved past it.
    pub fn resolved_scenario(&self) -> Option<&Scenario> {
        let session = self.session.as_ref()?;
        session.feedback.as_ref()?;
        session
            .cursor
            .checked_sub(1)
            .and_then(|i| session.order.get(i))
    }

    /// Active -> Feedback on a player choice. `NoAnswer` only ever comes
    /// from the question timer, never from input.
    pub fn submit_choice(&mut self, choice: Choice) {
        if self.phase != Phase::Active || choice == Choice::NoAnswer {
            return;
        }
        self.resolve_current(choice);
    }

    /// Whole seconds left on the question clock, rounded up. Mirrors a
    /// once-per-second display countdown: 14.9s shows (and scores) as 15.
    pub fn question_units_remaining(&self) -> u32 {
        let ms = self
            .session
            .as_ref()
            .map(|s| s.question_ms_remaining)
            .unwrap_or(0);
        ms.div_ceil(1000) as u32
    }

    /// Whole seconds left on the session clock, rounded up.
    pub fn session_units_remaining(&self) -> u32 {
        let ms = self
            .session
            .as_ref()
            .map(|s| s.session_ms_remaining)
            .unwrap_or(0);
        ms.div_ceil(1000) as u32
    }

    /// Fraction of the question window still available, in [0, 1].
    pub fn question_fraction(&self) -> f64 {
        if self.config.question_ms == 0 {
            return 0.0;
        }
        let ms = self
            .session
            .as_ref()
            .map(|s| s.question_ms_remaining)
            .unwrap_or(0);
        ms as f64 / self.config.question_ms as f64
    }

    pub fn timer_tier(&self) -> TimerTier {
        let fraction = self.question_fraction();
        if fraction >= 0.6 {
            TimerTier::Fresh
        } else if fraction >= 0.3 {
            TimerTier::Waning
        } else {
            TimerTier::Critical
        }
    }

    // --- clock ---

    /// Advance all clocks relevant to the current phase by one tick.
    /// Session expiry preempts question resolution and any pending
    /// feedback auto-advance.
    pub fn on_tick(&mut self) {
        match self.phase {
            Phase::Intro | Phase::GameOver => {}
            Phase::Active => {
                if self.tick_session_clock() {
                    return;
                }
                let expired = {
                    let session = self
                        .session
                        .as_mut()
                        .expect("active phase without a session");
                    session.question_ms_remaining =
                        session.question_ms_remaining.saturating_sub(TICK_RATE_MS);
                    session.question_ms_remaining == 0
                };
                if expired {
                    self.resolve_current(Choice::NoAnswer);
                }
            }
            Phase::Feedback => {
                if self.tick_session_clock() {
                    return;
                }
                let expired = {
                    let session = self
                        .session
                        .as_mut()
                        .expect("feedback phase without a session");
                    session.feedback_ms_remaining =
                        session.feedback_ms_remaining.saturating_sub(TICK_RATE_MS);
                    session.feedback_ms_remaining == 0
                };
                if expired {
                    self.advance_past_feedback();
                }
            }
        }
    }

    /// Returns true when the session clock ran out and the game ended.
    fn tick_session_clock(&mut self) -> bool {
        let expired = {
            let session = self.session.as_mut().expect("running phase without a session");
            session.session_ms_remaining =
                session.session_ms_remaining.saturating_sub(TICK_RATE_MS);
            session.session_ms_remaining == 0
        };
        if expired {
            self.finish();
        }
        expired
    }

    // --- transitions ---

    fn begin_question(&mut self) {
        let exhausted = {
            let session = self.session.as_mut().expect("no session to start a question in");
            if session.cursor < session.order.len() {
                session.question_ms_remaining = self.config.question_ms;
                session.feedback = None;
                false
            } else {
                true
            }
        };

        if exhausted {
            self.finish();
        } else {
            self.phase = Phase::Active;
        }
    }

    fn resolve_current(&mut self, choice: Choice) {
        let units = self.question_units_remaining();
        let session = self.session.as_mut().expect("no session to resolve");
        let (is_unsafe, explanation) = {
            let scenario = &session.order[session.cursor];
            (scenario.is_unsafe, scenario.explanation.clone())
        };

        let resolution = scoring::resolve(choice, is_unsafe, units, session.streak);

        session.score += resolution.points_awarded;
        session.streak = resolution.new_streak;
        session.feedback = Some(Feedback {
            choice,
            correct: resolution.correct,
            points_awarded: resolution.points_awarded,
            explanation,
        });
        session.cursor += 1;
        session.feedback_ms_remaining = self.config.feedback_ms;
        self.phase = Phase::Feedback;
    }

    fn advance_past_feedback(&mut self) {
        self.begin_question();
    }

    /// Enter GameOver and report the final score, at most once per session.
    fn finish(&mut self) {
        self.phase = Phase::GameOver;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.reported {
            return;
        }
        session.reported = true;

        if let Some(reporter) = &self.reporter {
            report::submit_detached(
                reporter.clone(),
                ScoreEntry::new(session.player_name.clone(), session.score),
            );
        }
    }

    // --- game over ---

    pub fn final_score(&self) -> u32 {
        self.session.as_ref().map(|s| s.score).unwrap_or(0)
    }

    /// GameOver -> Intro. Nothing carries over.
    pub fn request_replay(&mut self) {
        if self.phase != Phase::GameOver {
            return;
        }
        self.session = None;
        self.name_entry.clear();
        self.intro_error = None;
        self.phase = Phase::Intro;
    }
}
