use std::cell::Cell;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::enrich::{EnrichmentError, LOAD_FAILED_MESSAGE};
use crate::runtime::AppEvent;
use crate::session::{Action, Phase, Session};
use crate::verb::VerbRecord;

/// Whether the main loop keeps running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Reveal of the next card, due at `due` for the session identified by `epoch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReveal {
    pub epoch: u64,
    pub due: Instant,
}

#[derive(Debug, Default)]
pub struct SummaryState {
    pub scroll_offset: usize,
    /// Mistake rows the last render had room for; 0 until first drawn
    pub visible_rows: Cell<usize>,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub reveal_delay: Duration,
    pub pending_reveal: Option<PendingReveal>,
    pub summary_state: SummaryState,
    /// Advances on every tick while loading
    pub spinner_frame: usize,
}

impl App {
    pub fn new(session: Session, reveal_delay: Duration) -> Self {
        Self {
            session,
            reveal_delay,
            pending_reveal: None,
            summary_state: SummaryState::default(),
            spinner_frame: 0,
        }
    }

    pub fn on_event(&mut self, event: AppEvent, now: Instant) -> Control {
        match event {
            AppEvent::Tick => {
                self.on_tick(now);
                Control::Continue
            }
            AppEvent::Resize => Control::Continue,
            AppEvent::Enriched(result) => {
                self.on_enriched(result, now);
                Control::Continue
            }
            AppEvent::Key(key) => self.on_key(key, now),
        }
    }

    /// Whether ticks need a redraw (spinner running or a card waiting to be revealed)
    pub fn is_animating(&self) -> bool {
        self.session.phase() == Phase::Loading || self.pending_reveal.is_some()
    }

    fn on_tick(&mut self, now: Instant) {
        if self.session.phase() == Phase::Loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }

        if let Some(pending) = self.pending_reveal {
            if pending.due <= now {
                self.pending_reveal = None;
                self.dispatch(
                    Action::Reveal {
                        epoch: pending.epoch,
                    },
                    now,
                );
            }
        }
    }

    fn on_enriched(&mut self, result: Result<Vec<VerbRecord>, EnrichmentError>, now: Instant) {
        let action = match result {
            Ok(verbs) => {
                tracing::info!(verbs = verbs.len(), "verb pool ready");
                Action::Loaded(verbs)
            }
            Err(err) => {
                tracing::error!(%err, "could not load verb data");
                Action::LoadFailed(LOAD_FAILED_MESSAGE.to_string())
            }
        };
        self.dispatch(action, now);
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }

        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        let action = match (self.session.phase(), code) {
            (Phase::Ready, KeyCode::Char('o') | KeyCode::Char('1')) => {
                Action::Start { shuffle: false }
            }
            (Phase::Ready, KeyCode::Char('s') | KeyCode::Char('2')) => {
                Action::Start { shuffle: true }
            }
            (Phase::Reviewing, KeyCode::Char(' ') | KeyCode::Enter) => Action::Flip,
            (Phase::Reviewing, KeyCode::Char('y')) => Action::Answer { known: true },
            (Phase::Reviewing, KeyCode::Char('n')) => Action::Answer { known: false },
            (Phase::Reviewing, KeyCode::Char('x')) => Action::EndEarly,
            (Phase::Summary, KeyCode::Char('r')) => Action::Restart,
            (Phase::Summary, KeyCode::Char('m')) => Action::RetryMistakes,
            (Phase::Summary, nav) => {
                self.scroll_summary(nav);
                return Control::Continue;
            }
            _ => return Control::Continue,
        };

        self.dispatch(action, now);
        Control::Continue
    }

    fn scroll_summary(&mut self, code: KeyCode) {
        let visible = self.summary_state.visible_rows.get().max(1);
        let max_scroll = self.session.mistakes().len().saturating_sub(visible);
        let offset = &mut self.summary_state.scroll_offset;
        match code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset += 1,
            KeyCode::PageUp => *offset = offset.saturating_sub(10),
            KeyCode::PageDown => *offset += 10,
            KeyCode::Home => *offset = 0,
            _ => {}
        }
        *offset = (*offset).min(max_scroll);
    }

    /// Feed one action into the session; rejected actions are logged and dropped
    pub fn dispatch(&mut self, action: Action, now: Instant) {
        let is_answer = matches!(action, Action::Answer { .. });
        let label = action.to_string();

        if let Err(err) = self.session.dispatch(action) {
            tracing::debug!(action = %label, %err, "ignored action");
            return;
        }
        tracing::trace!(action = %label, phase = %self.session.phase(), "transition");

        if self.session.phase() != Phase::Reviewing {
            // ended or restarted: nothing left to reveal
            self.pending_reveal = None;
        }
        if self.session.phase() != Phase::Summary {
            self.summary_state.scroll_offset = 0;
        }

        if is_answer && self.session.is_revealing() {
            self.schedule_reveal(now);
        }
    }

    fn schedule_reveal(&mut self, now: Instant) {
        let epoch = self.session.epoch();
        if self.reveal_delay.is_zero() {
            self.dispatch(Action::Reveal { epoch }, now);
        } else {
            self.pending_reveal = Some(PendingReveal {
                epoch,
                due: now + self.reveal_delay,
            });
        }
    }
}
