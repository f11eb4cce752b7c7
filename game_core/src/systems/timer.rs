use crate::{Events, FrameTime, GameEvent, GameState, InputState};
use tracing::info;

/// Count the run down by wall-clock time and end it at zero
pub fn tick_timer(state: &mut GameState, input: &mut InputState, time: &FrameTime, events: &mut Events) {
    if state.tick_timer(time.real_dt) {
        input.clear();
        info!(score = state.score, "game over");
        events.push(GameEvent::GameOver { score: state.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_over_releases_controls() {
        let mut state = GameState::default();
        state.begin_run(0.1);
        state.score = 4;
        let mut input = InputState {
            forward: 1,
            right: 0,
            lower: true,
        };
        let mut events = Events::new();

        tick_timer(&mut state, &mut input, &FrameTime::new(0.0, 0.25), &mut events);

        assert!(state.over);
        assert_eq!(input, InputState::default());
        assert_eq!(events.drain(), vec![GameEvent::GameOver { score: 4 }]);
    }

    #[test]
    fn test_timer_uses_uncapped_delta() {
        let mut state = GameState::default();
        state.begin_run(10.0);
        let mut events = Events::new();
        let time = FrameTime::new(0.0, 0.5);
        assert!(time.dt < time.real_dt);

        tick_timer(&mut state, &mut InputState::new(), &time, &mut events);

        assert!((state.time_left - 9.5).abs() < 1e-6);
    }
}
