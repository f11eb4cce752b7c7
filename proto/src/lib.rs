//! Persisted formats for the claw machine
//!
//! Everything here ends up as JSON text in a browser key-value store
//! (localStorage in the client, an in-memory map in tests and tools).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// High score, stored as a bare integer string
pub const HIGH_SCORE_KEY: &str = "cranegame_high";
/// Settings blob
pub const SETTINGS_KEY: &str = "cranegame_settings";
/// Last saved replay blob
pub const REPLAY_KEY: &str = "cranegame_replay";
/// Set once the instructions have been shown
pub const VISITED_KEY: &str = "cranegame_visited";

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

// ============================================================================
// Difficulty
// ============================================================================

/// Difficulty selected from the pre-game menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ProtoError::UnknownDifficulty(other.to_string())),
        }
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Only keyboard actions are recorded today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Key,
}

/// One recorded key transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAction {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    pub key: String,
    pub is_down: bool,
    /// Milliseconds since recording started
    pub timestamp: f64,
}

impl KeyAction {
    pub fn new(key: impl Into<String>, is_down: bool, timestamp: f64) -> Self {
        Self {
            kind: ActionKind::Key,
            key: key.into(),
            is_down,
            timestamp,
        }
    }
}

/// Saved replay: the action log plus what the run looked like when saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayBlob {
    pub actions: Vec<KeyAction>,
    /// Wall-clock save time, milliseconds since the Unix epoch
    pub timestamp: u64,
    pub score: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl ReplayBlob {
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Timestamp of the last action, or 0 for an empty log
    pub fn duration_ms(&self) -> f64 {
        self.actions.last().map(|a| a.timestamp).unwrap_or(0.0)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Presentation options. Missing fields keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub shadows: bool,
    pub particles: bool,
    pub mini_grid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shadows: true,
            particles: true,
            mini_grid: false,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Corrupt blobs are ignored
    pub fn from_json_or_default(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }
}

// ============================================================================
// Key-value store
// ============================================================================

/// String key-value storage (localStorage semantics: writes may silently fail)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and headless tools
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

pub fn load_high_score(store: &impl KeyValueStore) -> u32 {
    store
        .get(HIGH_SCORE_KEY)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_high_score(store: &mut impl KeyValueStore, score: u32) {
    store.set(HIGH_SCORE_KEY, &score.to_string());
}

pub fn clear_high_score(store: &mut impl KeyValueStore) {
    store.remove(HIGH_SCORE_KEY);
}

pub fn load_settings(store: &impl KeyValueStore) -> Settings {
    store
        .get(SETTINGS_KEY)
        .map(|text| Settings::from_json_or_default(&text))
        .unwrap_or_default()
}

pub fn save_settings(store: &mut impl KeyValueStore, settings: &Settings) -> Result<(), ProtoError> {
    store.set(SETTINGS_KEY, &settings.to_json()?);
    Ok(())
}

pub fn save_replay(store: &mut impl KeyValueStore, replay: &ReplayBlob) -> Result<(), ProtoError> {
    store.set(REPLAY_KEY, &replay.to_json()?);
    Ok(())
}

/// `Ok(None)` when nothing was saved, `Err` when the saved blob is corrupt
pub fn load_replay(store: &impl KeyValueStore) -> Result<Option<ReplayBlob>, ProtoError> {
    match store.get(REPLAY_KEY) {
        Some(text) => ReplayBlob::from_json(&text).map(Some),
        None => Ok(None),
    }
}

/// Like `load_replay`, but a corrupt blob is removed so it only fails once
pub fn take_saved_replay(store: &mut impl KeyValueStore) -> Result<Option<ReplayBlob>, ProtoError> {
    let result = load_replay(store);
    if result.is_err() {
        store.remove(REPLAY_KEY);
    }
    result
}

/// Returns true the first time it is called against a store
pub fn mark_visited(store: &mut impl KeyValueStore) -> bool {
    if store.get(VISITED_KEY).is_some() {
        return false;
    }
    store.set(VISITED_KEY, "true");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_replay() -> ReplayBlob {
        ReplayBlob {
            actions: vec![
                KeyAction::new("w", true, 12.5),
                KeyAction::new(" ", true, 480.0),
                KeyAction::new("w", false, 480.0),
                KeyAction::new(" ", false, 2210.75),
            ],
            timestamp: 1_700_000_000_000,
            score: 3,
            difficulty: Difficulty::Hard,
        }
    }

    #[test]
    fn test_replay_json_preserves_order_and_timestamps() {
        let replay = sample_replay();
        let text = replay.to_json().expect("Serialization should succeed");
        let decoded = ReplayBlob::from_json(&text).expect("Deserialization should succeed");
        assert_eq!(decoded, replay);
        let keys: Vec<_> = decoded.actions.iter().map(|a| (a.key.as_str(), a.timestamp)).collect();
        assert_eq!(keys, vec![("w", 12.5), (" ", 480.0), ("w", 480.0), (" ", 2210.75)]);
    }

    #[test]
    fn test_replay_uses_browser_field_names() {
        let text = sample_replay().to_json().unwrap();
        assert!(text.contains("\"isDown\":true"));
        assert!(text.contains("\"type\":\"key\""));
        assert!(text.contains("\"difficulty\":\"hard\""));
    }

    #[test]
    fn test_replay_parses_browser_blob() {
        let text = r#"{"actions":[{"type":"key","key":"ArrowLeft","isDown":true,"timestamp":101.3}],
            "timestamp":1712345678901,"score":0,"difficulty":"easy"}"#;
        let replay = ReplayBlob::from_json(text).expect("browser blob should parse");
        assert_eq!(replay.actions.len(), 1);
        assert_eq!(replay.actions[0].key, "ArrowLeft");
        assert!(replay.actions[0].is_down);
        assert_eq!(replay.difficulty, Difficulty::Easy);
        assert_eq!(replay.duration_ms(), 101.3);
    }

    #[test]
    fn test_corrupt_replay_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(REPLAY_KEY, "{not json");
        let result = load_replay(&store);
        assert!(matches!(result, Err(ProtoError::Json(_))));
    }

    #[test]
    fn test_corrupt_replay_is_discarded_after_reporting() {
        let mut store = MemoryStore::new();
        store.set(REPLAY_KEY, "{not json");
        let first = take_saved_replay(&mut store);
        assert!(matches!(first, Err(ProtoError::Json(_))), "Failure is reported");
        assert!(store.get(REPLAY_KEY).is_none(), "Corrupt blob removed");
        assert!(take_saved_replay(&mut store).unwrap().is_none());
    }

    #[test]
    fn test_valid_replay_is_kept_after_loading() {
        let mut store = MemoryStore::new();
        let blob = ReplayBlob {
            actions: vec![KeyAction::new("a", true, 12.0)],
            timestamp: 5,
            score: 2,
            difficulty: Difficulty::Hard,
        };
        save_replay(&mut store, &blob).unwrap();
        assert_eq!(take_saved_replay(&mut store).unwrap(), Some(blob));
        assert!(store.get(REPLAY_KEY).is_some());
    }

    #[test]
    fn test_missing_replay_is_none() {
        let store = MemoryStore::new();
        assert!(load_replay(&store).unwrap().is_none());
    }

    #[test]
    fn test_settings_partial_blob_keeps_defaults() {
        let settings = Settings::from_json_or_default(r#"{"miniGrid":true}"#);
        assert!(settings.shadows);
        assert!(settings.particles);
        assert!(settings.mini_grid);
    }

    #[test]
    fn test_settings_corrupt_blob_falls_back() {
        assert_eq!(Settings::from_json_or_default("]]"), Settings::default());
    }

    #[test]
    fn test_high_score_store_helpers() {
        let mut store = MemoryStore::new();
        assert_eq!(load_high_score(&store), 0);
        save_high_score(&mut store, 17);
        assert_eq!(load_high_score(&store), 17);
        store.set(HIGH_SCORE_KEY, "garbage");
        assert_eq!(load_high_score(&store), 0);
        clear_high_score(&mut store);
        assert!(store.get(HIGH_SCORE_KEY).is_none());
    }

    #[test]
    fn test_settings_store_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            shadows: false,
            particles: true,
            mini_grid: true,
        };
        save_settings(&mut store, &settings).unwrap();
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn test_mark_visited_only_once() {
        let mut store = MemoryStore::new();
        assert!(mark_visited(&mut store));
        assert!(!mark_visited(&mut store));
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("Normal".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "brutal".parse::<Difficulty>(),
            Err(ProtoError::UnknownDifficulty(_))
        ));
    }
}
