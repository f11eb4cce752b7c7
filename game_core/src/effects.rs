//! Presentation side channels: particles, sound cues, toast text, FPS

use crate::GameEvent;
use glam::Vec3;
use rand::Rng;

// ============================================================================
// Particles
// ============================================================================

pub const BURST_COUNT: usize = 12;
pub const PARTICLE_LIFE: f32 = 0.6;
pub const PARTICLE_GRAVITY: f32 = 5.0;
pub const PARTICLE_RADIUS: f32 = 0.05;
pub const PARTICLE_COLOR: u32 = 0xffd166;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
}

impl Particle {
    /// 1 when fresh, 0 when expired
    pub fn opacity(&self) -> f32 {
        (self.life / PARTICLE_LIFE).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn burst(&mut self, origin: Vec3, rng: &mut impl Rng) {
        for _ in 0..BURST_COUNT {
            let velocity = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 2.0,
                rng.gen::<f32>() * 2.0,
                (rng.gen::<f32>() - 0.5) * 2.0,
            );
            self.particles.push(Particle {
                position: origin,
                velocity,
                life: PARTICLE_LIFE,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.velocity.y -= PARTICLE_GRAVITY * dt;
            p.position += p.velocity * dt;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

// ============================================================================
// Sound cues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// One oscillator blip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration: f32,
    pub volume: f32,
    pub waveform: Waveform,
    /// Delay before the tone starts, in milliseconds
    pub delay_ms: u32,
}

pub const CLAW_CUE: Tone = Tone {
    frequency: 320.0,
    duration: 0.07,
    volume: 0.15,
    waveform: Waveform::Square,
    delay_ms: 0,
};

/// Two rising blips whose pitch climbs with the combo
pub fn score_chime(combo: u32) -> [Tone; 2] {
    let pitch = 880.0 + combo as f32 * 50.0;
    [
        Tone {
            frequency: pitch,
            duration: 0.08,
            volume: 0.2,
            waveform: Waveform::Sine,
            delay_ms: 0,
        },
        Tone {
            frequency: pitch + 440.0,
            duration: 0.08,
            volume: 0.18,
            waveform: Waveform::Sine,
            delay_ms: 60,
        },
    ]
}

/// Sounds for an event, if any
pub fn tones_for(event: &GameEvent) -> Vec<Tone> {
    match event {
        GameEvent::ClawClosing => vec![CLAW_CUE],
        GameEvent::Scored { combo, .. } => score_chime(*combo).to_vec(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Toasts
// ============================================================================

pub const TOAST_MS: u32 = 2000;

/// Achievement text for an event, if it gets a toast
pub fn toast_for(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::Combo { combo } => Some(format!("Combo x{combo}!")),
        GameEvent::Milestone { score: 1 } => Some("First prize!".to_string()),
        GameEvent::Milestone { score } => Some(format!("{score} prizes!")),
        GameEvent::ReplayFinished => Some("Replay finished".to_string()),
        _ => None,
    }
}

/// Key label for the replay input visualiser
pub fn key_label(key: &str) -> String {
    match key {
        "w" => "W".to_string(),
        "a" => "A".to_string(),
        "s" => "S".to_string(),
        "d" => "D".to_string(),
        "ArrowUp" => "↑".to_string(),
        "ArrowDown" => "↓".to_string(),
        "ArrowLeft" => "←".to_string(),
        "ArrowRight" => "→".to_string(),
        " " => "SPACE".to_string(),
        other => other.to_uppercase(),
    }
}

// ============================================================================
// FPS
// ============================================================================

pub const FPS_SAMPLE_MS: f64 = 500.0;

/// Averages frame rate over half-second windows
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsMeter {
    frames: u32,
    elapsed: f32,
    window_start_ms: Option<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reading when a window closes
    pub fn sample(&mut self, now_ms: f64, real_dt: f32) -> Option<u32> {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        self.elapsed += real_dt;
        if now_ms - start < FPS_SAMPLE_MS {
            return None;
        }
        let fps = if self.elapsed > 0.0 {
            (self.frames as f32 / self.elapsed).round() as u32
        } else {
            0
        };
        self.frames = 0;
        self.elapsed = 0.0;
        self.window_start_ms = Some(now_ms);
        Some(fps)
    }
}

/// HUD colour for a frame rate
pub fn fps_color(fps: u32) -> &'static str {
    match fps {
        50.. => "#5ad878",
        30..=49 => "#ffd166",
        _ => "#ff6b6b",
    }
}
