//! Input recording and playback
//!
//! Recording timestamps are relative to when recording started. Playback
//! re-dispatches every action whose timestamp has been reached by the scaled
//! time since playback started.

use crate::SessionError;
use proto::{Difficulty, KeyAction, ReplayBlob};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Playback {
    start_ms: f64,
    cursor: usize,
}

/// Actions that came due this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    pub actions: Vec<KeyAction>,
    /// The cursor ran off the end of the log and playback stopped
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct ReplayLog {
    actions: Vec<KeyAction>,
    record_start_ms: Option<f64>,
    playback: Option<Playback>,
    speed: f64,
}

impl Default for ReplayLog {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            record_start_ms: None,
            playback: None,
            speed: 1.0,
        }
    }
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[KeyAction] {
        &self.actions
    }

    pub fn is_recording(&self) -> bool {
        self.record_start_ms.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Non-positive or non-finite speeds are ignored
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        }
    }

    /// Starting clears the log; stopping keeps it. Returns the new state.
    pub fn toggle_record(&mut self, now_ms: f64) -> bool {
        if self.record_start_ms.take().is_none() {
            self.actions.clear();
            self.record_start_ms = Some(now_ms);
        }
        self.is_recording()
    }

    /// Append a live key transition if recording
    pub fn record(&mut self, key: &str, is_down: bool, now_ms: f64) {
        if let Some(start) = self.record_start_ms {
            self.actions.push(KeyAction::new(key, is_down, now_ms - start));
        }
    }

    pub fn start_playback(&mut self, now_ms: f64) -> Result<(), SessionError> {
        if self.actions.is_empty() {
            return Err(SessionError::EmptyReplay);
        }
        self.playback = Some(Playback {
            start_ms: now_ms,
            cursor: 0,
        });
        Ok(())
    }

    pub fn stop_playback(&mut self) {
        self.playback = None;
    }

    /// Pull every action due at `now_ms` and advance the cursor
    pub fn due(&mut self, now_ms: f64) -> Dispatch {
        let Some(playback) = self.playback.as_mut() else {
            return Dispatch::default();
        };
        let elapsed = (now_ms - playback.start_ms) * self.speed;
        let mut dispatch = Dispatch::default();
        while let Some(action) = self.actions.get(playback.cursor) {
            if action.timestamp > elapsed {
                break;
            }
            dispatch.actions.push(action.clone());
            playback.cursor += 1;
        }
        if playback.cursor >= self.actions.len() {
            self.playback = None;
            dispatch.finished = true;
        }
        dispatch
    }

    /// Snapshot for saving; `None` when nothing has been recorded
    pub fn to_blob(&self, score: u32, difficulty: Difficulty, saved_at_ms: u64) -> Option<ReplayBlob> {
        if self.actions.is_empty() {
            return None;
        }
        Some(ReplayBlob {
            actions: self.actions.clone(),
            timestamp: saved_at_ms,
            score,
            difficulty,
        })
    }

    /// Replace the log with a loaded one. Any playback in progress stops.
    pub fn load(&mut self, blob: ReplayBlob) {
        self.actions = blob.actions;
        self.playback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded() -> ReplayLog {
        let mut log = ReplayLog::new();
        log.toggle_record(1000.0);
        log.record("d", true, 1100.0);
        log.record("d", false, 1600.0);
        log.record(" ", true, 2000.0);
        log.toggle_record(2500.0);
        log
    }

    #[test]
    fn test_record_stamps_relative_time() {
        let log = recorded();
        let stamps: Vec<f64> = log.actions().iter().map(|a| a.timestamp).collect();
        assert_eq!(stamps, vec![100.0, 600.0, 1000.0]);
        assert!(!log.is_recording());
    }

    #[test]
    fn test_record_ignored_when_not_recording() {
        let mut log = ReplayLog::new();
        log.record("w", true, 10.0);
        assert!(log.actions().is_empty());
    }

    #[test]
    fn test_restart_recording_clears_log() {
        let mut log = recorded();
        assert!(log.toggle_record(5000.0));
        assert!(log.actions().is_empty());
    }

    #[test]
    fn test_playback_dispatches_in_order() {
        let mut log = recorded();
        log.start_playback(10_000.0).unwrap();

        assert!(log.due(10_050.0).actions.is_empty());
        let first = log.due(10_600.0);
        assert_eq!(first.actions.len(), 2);
        assert!(!first.finished);
        let last = log.due(11_000.0);
        assert_eq!(last.actions.len(), 1);
        assert!(last.finished);
        assert!(!log.is_playing());
    }

    #[test]
    fn test_playback_speed_scales_elapsed_time() {
        let mut log = recorded();
        log.set_speed(2.0);
        log.start_playback(0.0).unwrap();
        let dispatch = log.due(500.0);
        assert_eq!(dispatch.actions.len(), 3, "1000 ms of log at 2x takes 500 ms");
        assert!(dispatch.finished);
    }

    #[test]
    fn test_invalid_speed_ignored() {
        let mut log = ReplayLog::new();
        log.set_speed(0.0);
        log.set_speed(f64::NAN);
        assert_eq!(log.speed(), 1.0);
    }

    #[test]
    fn test_empty_log_cannot_play() {
        let mut log = ReplayLog::new();
        assert!(matches!(log.start_playback(0.0), Err(SessionError::EmptyReplay)));
        assert!(log.to_blob(0, Difficulty::Normal, 0).is_none());
    }

    #[test]
    fn test_blob_round_trip_through_json() {
        let log = recorded();
        let blob = log.to_blob(2, Difficulty::Easy, 1_700_000_000_000).unwrap();
        let text = blob.to_json().unwrap();

        let mut restored = ReplayLog::new();
        restored.load(ReplayBlob::from_json(&text).unwrap());

        assert_eq!(restored.actions(), log.actions());
    }
}
