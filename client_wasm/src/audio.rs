//! WebAudio beeps for the cues in `game_core::effects`

use game_core::effects::{Tone, Waveform};
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

const SILENCE: f32 = 0.0001;

pub struct Audio {
    context: Option<AudioContext>,
    muted: bool,
}

impl Audio {
    pub fn new() -> Self {
        Self {
            context: None,
            muted: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Browsers only allow a context after a user gesture, so it is opened
    /// on the first cue
    fn context(&mut self) -> Option<&AudioContext> {
        if self.context.is_none() {
            self.context = AudioContext::new().ok();
        }
        self.context.as_ref()
    }

    pub fn play(&mut self, tones: &[Tone]) {
        if self.muted || tones.is_empty() {
            return;
        }
        let Some(ctx) = self.context() else {
            return;
        };
        let _ = ctx.resume();
        for tone in tones {
            if let Err(err) = schedule(ctx, tone) {
                web_sys::console::warn_2(&"tone failed".into(), &err);
            }
        }
    }
}

fn schedule(ctx: &AudioContext, tone: &Tone) -> Result<(), JsValue> {
    let start = ctx.current_time() + f64::from(tone.delay_ms) / 1000.0;
    let end = start + f64::from(tone.duration);

    let osc = ctx.create_oscillator()?;
    osc.set_type(match tone.waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
    });
    osc.frequency().set_value(tone.frequency);

    let gain = ctx.create_gain()?;
    gain.gain().set_value_at_time(tone.volume, start)?;
    gain.gain().exponential_ramp_to_value_at_time(SILENCE, end)?;

    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    osc.start_with_when(start)?;
    osc.stop_with_when(end)?;
    Ok(())
}
