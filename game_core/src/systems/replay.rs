use crate::{Events, GameEvent, InputState, ReplayLog};
use tracing::debug;

/// Feed due recorded actions into the input state as if freshly typed
pub fn dispatch_replay(replay: &mut ReplayLog, input: &mut InputState, now_ms: f64, events: &mut Events) {
    if !replay.is_playing() {
        return;
    }
    let dispatch = replay.due(now_ms);
    for action in dispatch.actions {
        input.apply_key(&action.key, action.is_down);
        events.push(GameEvent::ReplayInput {
            key: action.key,
            is_down: action.is_down,
        });
    }
    if dispatch.finished {
        debug!("replay finished");
        events.push(GameEvent::ReplayFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_actions_drive_input() {
        let mut replay = ReplayLog::new();
        replay.toggle_record(0.0);
        replay.record("d", true, 100.0);
        replay.record(" ", true, 200.0);
        replay.record("d", false, 900.0);
        replay.toggle_record(1000.0);
        replay.start_playback(5000.0).unwrap();
        let mut input = InputState::new();
        let mut events = Events::new();

        dispatch_replay(&mut replay, &mut input, 5250.0, &mut events);
        assert_eq!(input.right, 1);
        assert!(input.lower);
        assert_eq!(events.count(|e| matches!(e, GameEvent::ReplayInput { .. })), 2);

        dispatch_replay(&mut replay, &mut input, 6000.0, &mut events);
        assert_eq!(input.right, 0);
        assert!(events.iter().any(|e| *e == GameEvent::ReplayFinished));
        assert!(!replay.is_playing());
    }

    #[test]
    fn test_idle_log_is_untouched() {
        let mut replay = ReplayLog::new();
        let mut input = InputState::new();
        let mut events = Events::new();
        dispatch_replay(&mut replay, &mut input, 1e9, &mut events);
        assert!(events.is_empty());
    }
}
