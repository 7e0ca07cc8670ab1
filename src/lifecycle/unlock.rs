//! Pattern unlock gesture on a 3x3 grid.
//!
//! Points are ids 0..=8, row-major. The gesture only judges the attempt;
//! the controller owns the confirm/reset timers and applies the unlock.

use crate::config::validator::GRID_POINTS;

/// Result of feeding one point into the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Repeat point, out-of-grid id, or a result is already pending.
    Ignored,
    /// Point recorded, attempt not complete yet.
    Pending,
    /// Attempt complete and matches the reference.
    Accepted,
    /// Attempt complete and does not match.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct UnlockGesture {
    reference: Vec<u8>,
    attempt: Vec<u8>,
    result: Option<bool>,
    /// Bumped whenever the attempt is dropped, so a timer armed for one
    /// attempt can tell it no longer applies.
    generation: u64,
}

impl UnlockGesture {
    pub fn new(reference: Vec<u8>) -> Self {
        UnlockGesture {
            reference,
            attempt: Vec::new(),
            result: None,
            generation: 0,
        }
    }

    pub fn select(&mut self, point: u8) -> GestureOutcome {
        if self.result.is_some() || point >= GRID_POINTS || self.attempt.contains(&point) {
            return GestureOutcome::Ignored;
        }

        self.attempt.push(point);
        if self.attempt.len() < self.reference.len() {
            return GestureOutcome::Pending;
        }

        let correct = self.attempt == self.reference;
        self.result = Some(correct);
        if correct {
            GestureOutcome::Accepted
        } else {
            GestureOutcome::Rejected
        }
    }

    /// Points selected so far, in order.
    pub fn attempt(&self) -> &[u8] {
        &self.attempt
    }

    pub fn is_selected(&self, point: u8) -> bool {
        self.attempt.contains(&point)
    }

    /// `Some(true)` while a correct attempt waits to unlock, `Some(false)`
    /// while the failure flash is shown.
    pub fn result(&self) -> Option<bool> {
        self.result
    }

    pub fn is_pending(&self) -> bool {
        self.result.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the attempt and any result.
    pub fn reset(&mut self) {
        self.attempt.clear();
        self.result = None;
        self.generation += 1;
    }

    /// "Borrar": clear a partial attempt. Refused while a result is pending.
    pub fn clear(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.attempt.clear();
        self.generation += 1;
        true
    }
}
