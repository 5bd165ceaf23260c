//! Study session state machine.
//!
//! All state lives in [`Session`] and changes only through [`Session::dispatch`].
//! A rejected action returns [`InvalidAction`] and leaves the session untouched.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::util::score_percent;
use crate::verb::{SessionResult, VerbRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Loading,
    Ready,
    Reviewing,
    Summary,
    Error,
}

#[derive(Debug, Clone, PartialEq, strum_macros::Display)]
pub enum Action {
    /// Enrichment succeeded with the full verb pool
    Loaded(Vec<VerbRecord>),
    /// Enrichment failed; carries the message shown to the user
    LoadFailed(String),
    Start {
        shuffle: bool,
    },
    Flip,
    Answer {
        known: bool,
    },
    EndEarly,
    Restart,
    RetryMistakes,
    /// Fired by the reveal timer scheduled after an answer
    Reveal {
        epoch: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAction {
    #[error("{action} is not accepted while {phase}")]
    WrongPhase { action: String, phase: Phase },
    #[error("answer submitted before the card was flipped")]
    NotFlipped,
    #[error("no mistakes to review")]
    NoMistakes,
    #[error("reveal for epoch {got} is stale (current epoch {current})")]
    StaleReveal { got: u64, current: u64 },
}

/// Tally of a finished (or abandoned) session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub known: usize,
    pub mistakes: Vec<VerbRecord>,
    pub score: u32,
}

/// Uniformly random permutation of `pool` (Fisher-Yates)
pub fn shuffled<T: Clone, R: Rng + ?Sized>(pool: &[T], rng: &mut R) -> Vec<T> {
    let mut out = pool.to_vec();
    out.shuffle(rng);
    out
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    error: Option<String>,
    verb_pool: Vec<VerbRecord>,
    queue: Vec<VerbRecord>,
    cursor: usize,
    flipped: bool,
    revealing: bool,
    results: Vec<SessionResult>,
    epoch: u64,
    rng: StdRng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: Phase::Loading,
            error: None,
            verb_pool: Vec::new(),
            queue: Vec::new(),
            cursor: 0,
            flipped: false,
            revealing: false,
            results: Vec::new(),
            epoch: 0,
            rng,
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), InvalidAction> {
        match (self.phase, action) {
            (Phase::Loading, Action::Loaded(pool)) => {
                self.verb_pool = pool;
                self.phase = Phase::Ready;
            }
            (Phase::Loading, Action::LoadFailed(message)) => {
                self.error = Some(message);
                self.phase = Phase::Error;
            }
            (Phase::Ready, Action::Start { shuffle }) => {
                let pool = self.verb_pool.clone();
                self.begin(pool, shuffle);
            }
            (Phase::Reviewing, Action::Flip) => self.flipped = !self.flipped,
            (Phase::Reviewing, Action::Answer { known }) => self.answer(known)?,
            (Phase::Reviewing, Action::Reveal { epoch }) => self.reveal(epoch)?,
            (Phase::Reviewing, Action::EndEarly) => {
                self.epoch += 1;
                self.flipped = false;
                self.revealing = false;
                self.phase = Phase::Summary;
            }
            (Phase::Summary, Action::Restart) => {
                self.queue.clear();
                self.results.clear();
                self.cursor = 0;
                self.phase = Phase::Ready;
            }
            (Phase::Summary, Action::RetryMistakes) => {
                let mistakes = self.mistakes();
                if mistakes.is_empty() {
                    return Err(InvalidAction::NoMistakes);
                }
                self.begin(mistakes, true);
            }
            (phase, action) => {
                return Err(InvalidAction::WrongPhase {
                    action: action.to_string(),
                    phase,
                })
            }
        }
        Ok(())
    }

    fn begin(&mut self, source: Vec<VerbRecord>, shuffle: bool) {
        self.queue = if shuffle {
            shuffled(&source, &mut self.rng)
        } else {
            source
        };
        self.cursor = 0;
        self.results.clear();
        self.flipped = false;
        self.revealing = false;
        self.epoch += 1;
        // nothing to review: go straight to an empty summary
        self.phase = if self.queue.is_empty() {
            Phase::Summary
        } else {
            Phase::Reviewing
        };
    }

    fn answer(&mut self, known: bool) -> Result<(), InvalidAction> {
        if !self.flipped {
            return Err(InvalidAction::NotFlipped);
        }

        let verb = self.queue[self.cursor].clone();
        self.results.push(SessionResult { verb, known });
        self.flipped = false;
        self.cursor += 1;

        if self.cursor == self.queue.len() {
            self.revealing = false;
            self.phase = Phase::Summary;
        } else {
            self.revealing = true;
        }
        Ok(())
    }

    fn reveal(&mut self, epoch: u64) -> Result<(), InvalidAction> {
        if epoch != self.epoch || !self.revealing {
            return Err(InvalidAction::StaleReveal {
                got: epoch,
                current: self.epoch,
            });
        }
        self.revealing = false;
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn verb_pool(&self) -> &[VerbRecord] {
        &self.verb_pool
    }

    pub fn queue(&self) -> &[VerbRecord] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Card under review, if any
    pub fn current(&self) -> Option<&VerbRecord> {
        match self.phase {
            Phase::Reviewing => self.queue.get(self.cursor),
            _ => None,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// True between an answer and the reveal of the next card
    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    /// Identifies the current session; bumped on every start and early end
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn mistakes(&self) -> Vec<VerbRecord> {
        self.results
            .iter()
            .filter(|r| !r.known)
            .map(|r| r.verb.clone())
            .collect()
    }

    pub fn has_mistakes(&self) -> bool {
        self.results.iter().any(|r| !r.known)
    }

    pub fn summary(&self) -> Summary {
        let known = self.results.iter().filter(|r| r.known).count();
        let total = self.results.len();
        Summary {
            total,
            known,
            mistakes: self.mistakes(),
            score: score_percent(known, total),
        }
    }
}
