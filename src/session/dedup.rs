//! Partial-hypothesis reducer.
//!
//! A streaming recognizer re-emits the same in-progress hypothesis on every
//! chunk while an utterance is slowly finalizing. This filter bounds the
//! resulting log volume: identical consecutive hypotheses are emitted at most
//! `cap` times, each annotated with its repeat ordinal, and any text change
//! emits immediately with a fresh counter.

use crate::defaults;

/// One emission decided by [`PartialDedup::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEmission {
    pub text: String,
    /// 1 for a newly seen hypothesis, 2..=cap for consecutive repeats.
    pub ordinal: u32,
}

/// Deduplication state for partial hypotheses.
///
/// Owned exclusively by the recognition loop; reset at session start and on
/// every final result.
#[derive(Debug)]
pub struct PartialDedup {
    last_partial: String,
    repeats: u32,
    cap: u32,
}

impl PartialDedup {
    pub fn new(cap: u32) -> Self {
        Self {
            last_partial: String::new(),
            repeats: 0,
            cap,
        }
    }

    /// Feed one non-empty candidate hypothesis.
    ///
    /// Returns `Some` when the candidate should be surfaced to the host.
    /// Repeats beyond the cap are suppressed silently, but the state still
    /// advances so a later text change is detected correctly.
    pub fn observe(&mut self, candidate: &str) -> Option<PartialEmission> {
        if candidate == self.last_partial {
            self.repeats += 1;
            if self.repeats <= self.cap {
                Some(PartialEmission {
                    text: candidate.to_string(),
                    ordinal: self.repeats,
                })
            } else {
                None
            }
        } else {
            self.last_partial = candidate.to_string();
            self.repeats = 1;
            Some(PartialEmission {
                text: candidate.to_string(),
                ordinal: 1,
            })
        }
    }

    /// Forget the current hypothesis. The next observation emits as ordinal 1.
    pub fn reset(&mut self) {
        self.last_partial.clear();
        self.repeats = 0;
    }

    /// True when a prior partial hypothesis is being held.
    pub fn has_pending(&self) -> bool {
        !self.last_partial.is_empty()
    }
}

impl Default for PartialDedup {
    fn default() -> Self {
        Self::new(defaults::PARTIAL_REPEAT_CAP)
    }
}
