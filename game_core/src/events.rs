use glam::Vec3;
use proto::Difficulty;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A run began, from a coin or from replay playback
    Started {
        difficulty: Difficulty,
        time_left: f32,
    },
    Paused {
        paused: bool,
    },
    /// The claw went from open to closing
    ClawClosing,
    Scored {
        score: u32,
        combo: u32,
        item: usize,
        at: Vec3,
    },
    Combo {
        combo: u32,
    },
    Milestone {
        score: u32,
    },
    HighScore {
        score: u32,
    },
    GameOver {
        score: u32,
    },
    Recording {
        active: bool,
    },
    ReplayStarted {
        actions: usize,
    },
    /// A recorded key was re-dispatched during playback
    ReplayInput {
        key: String,
        is_down: bool,
    },
    ReplayFinished,
    ReplayStopped,
}

/// Events emitted since the last drain
#[derive(Debug, Clone, Default)]
pub struct Events {
    queue: Vec<GameEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn count(&self, matches: impl Fn(&GameEvent) -> bool) -> usize {
        self.queue.iter().filter(|e| matches(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_drain_empties_queue() {
        let mut events = Events::new();
        events.push(GameEvent::ClawClosing);
        events.push(GameEvent::GameOver { score: 4 });

        let drained = events.drain();

        assert_eq!(drained.len(), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn test_events_count() {
        let mut events = Events::new();
        events.push(GameEvent::Milestone { score: 1 });
        events.push(GameEvent::ClawClosing);
        events.push(GameEvent::Milestone { score: 5 });
        assert_eq!(events.count(|e| matches!(e, GameEvent::Milestone { .. })), 2);
        events.clear();
        assert_eq!(events.len(), 0);
    }
}
