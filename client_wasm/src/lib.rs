//! WebGPU client for the claw machine
//!
//! Engine-free rendering using wgpu for WebGPU API. The page owns the
//! requestAnimationFrame loop and DOM events and forwards them to the
//! free functions below; everything else lives in `Client`.

#![cfg(target_arch = "wasm32")]

mod audio;
mod camera;
mod hud;
mod input;
mod mesh;
mod renderer;
mod storage;

use audio::Audio;
use game_core::effects::{toast_for, tones_for, FpsMeter, ParticleField};
use game_core::physics::RapierWorld;
use game_core::render::{plan_frame, Renderer, SceneOptions};
use game_core::{Config, CraneSession, FrameClock, GameEvent, GameRng, SessionError};
use hud::Hud;
use proto::{Difficulty, KeyValueStore, Settings};
use renderer::WgpuRenderer;
use std::cell::RefCell;
use storage::LocalStore;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub struct Client {
    session: CraneSession<RapierWorld>,
    renderer: WgpuRenderer,
    hud: Option<Hud>,
    audio: Audio,
    store: LocalStore,
    settings: Settings,
    top_view: bool,
    particles: ParticleField,
    particle_rng: GameRng,
    clock: FrameClock,
    fps: FpsMeter,
}

impl Client {
    pub async fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let renderer = WgpuRenderer::new(canvas).await.map_err(|e| JsValue::from_str(&e))?;
        let mut store = LocalStore::open();
        let settings = proto::load_settings(&store);
        let seed = js_sys::Date::now() as u64;

        let mut session = CraneSession::new(RapierWorld::new(), Config::new(), seed);
        session.set_high_score(proto::load_high_score(&store));

        let hud = Hud::new();
        if let Some(hud) = &hud {
            hud.show_instructions(proto::mark_visited(&mut store));
            hud.show_overlay("Claw Machine", "Insert a coin and press Start");
            hud.update(session.state());
        }

        Ok(Self {
            session,
            renderer,
            hud,
            audio: Audio::new(),
            store,
            settings,
            top_view: false,
            particles: ParticleField::new(),
            particle_rng: GameRng::new(seed ^ 0x9e37_79b9),
            clock: FrameClock::new(),
            fps: FpsMeter::new(),
        })
    }

    fn frame(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let time = self.clock.tick(now_ms);
        let events = self.session.frame(now_ms);
        for event in &events {
            self.react(event);
        }
        self.particles.update(time.dt);

        if let Some(hud) = &self.hud {
            if let Some(fps) = self.fps.sample(now_ms, time.real_dt) {
                hud.show_fps(fps);
            }
            hud.update(self.session.state());
        }

        let (width, height) = self.renderer.size();
        let options = SceneOptions {
            top_view: self.top_view,
            settings: self.settings,
        };
        let plan = plan_frame(
            self.session.world(),
            self.session.map(),
            &self.particles,
            &options,
            width,
            height,
        );
        self.renderer.render(&plan).map_err(|e| JsValue::from_str(&e))
    }

    fn react(&mut self, event: &GameEvent) {
        self.audio.play(&tones_for(event));
        if let (Some(hud), Some(text)) = (&self.hud, toast_for(event)) {
            hud.toast(&text);
        }
        match event {
            GameEvent::Scored { at, .. } if self.settings.particles => {
                self.particles.burst(*at, &mut self.particle_rng.0);
            }
            GameEvent::HighScore { score } => proto::save_high_score(&mut self.store, *score),
            _ => {}
        }

        let Some(hud) = &self.hud else {
            return;
        };
        match event {
            GameEvent::Started { .. } => {
                hud.hide_overlay();
                hud.set_paused(false);
            }
            GameEvent::Paused { paused } => hud.set_paused(*paused),
            GameEvent::GameOver { score } => {
                hud.show_overlay("Game Over", &format!("Score {score}. Insert a coin to play again."))
            }
            GameEvent::Recording { active } => hud.set_recording(*active),
            GameEvent::ReplayInput { key, is_down } => hud.show_replay_key(key, *is_down),
            _ => {}
        }
    }

    fn start(&mut self) {
        match self.session.start() {
            Ok(()) => {}
            Err(SessionError::NoCoins) => {
                if let Some(hud) = &self.hud {
                    hud.show_overlay("No Coins", "Insert a coin to play");
                }
            }
            Err(_) => {}
        }
    }

    fn set_option(&mut self, name: &str, enabled: bool) -> Result<(), JsValue> {
        match name {
            "shadows" => self.settings.shadows = enabled,
            "particles" => {
                self.settings.particles = enabled;
                if !enabled {
                    self.particles.clear();
                }
            }
            "miniGrid" => self.settings.mini_grid = enabled,
            other => return Err(JsValue::from_str(&format!("unknown option {other}"))),
        }
        if let Err(err) = proto::save_settings(&mut self.store, &self.settings) {
            self.toast(&format!("Settings not saved: {err}"));
        }
        Ok(())
    }

    fn save_replay(&mut self) -> bool {
        let Some(blob) = self.session.replay_blob(js_sys::Date::now() as u64) else {
            self.toast("Nothing recorded yet");
            return false;
        };
        match proto::save_replay(&mut self.store, &blob) {
            Ok(()) => {
                self.toast("Replay saved");
                true
            }
            Err(err) => {
                self.toast(&format!("Replay save failed: {err}"));
                false
            }
        }
    }

    fn load_replay(&mut self) -> bool {
        match proto::take_saved_replay(&mut self.store) {
            Ok(Some(blob)) => {
                self.session.set_difficulty(blob.difficulty);
                self.session.load_replay(blob);
                self.toast("Replay loaded");
                true
            }
            Ok(None) => {
                self.toast("No saved replay");
                false
            }
            Err(err) => {
                self.toast(&format!("Replay load failed: {err}"));
                false
            }
        }
    }

    fn toast(&self, text: &str) {
        if let Some(hud) = &self.hud {
            hud.toast(text);
        }
    }
}

thread_local! {
    static CLIENT: RefCell<Option<Client>> = const { RefCell::new(None) };
}

fn with_client<T>(f: impl FnOnce(&mut Client) -> T) -> Result<T, JsValue> {
    CLIENT.with(|cell| {
        let mut slot = cell.borrow_mut();
        let client = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Client not initialized"))?;
        Ok(f(client))
    })
}

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn init_client(canvas: HtmlCanvasElement) -> js_sys::Promise {
    wasm_bindgen_futures::future_to_promise(async move {
        let client = Client::new(canvas).await?;
        CLIENT.with(|cell| *cell.borrow_mut() = Some(client));
        Ok(JsValue::UNDEFINED)
    })
}

#[wasm_bindgen]
pub fn render_frame(now_ms: f64) -> Result<(), JsValue> {
    with_client(|c| c.frame(now_ms))?
}

#[wasm_bindgen]
pub fn resize(width: u32, height: u32) -> Result<(), JsValue> {
    with_client(|c| c.renderer.resize(width, height))
}

/// Returns true when the page should suppress the browser default
#[wasm_bindgen]
pub fn key_down(key: &str, now_ms: f64) -> Result<bool, JsValue> {
    with_client(|c| {
        if let Some(key) = input::normalize_key(key) {
            c.session.key(key, true, now_ms);
        }
        input::prevents_default(key)
    })
}

#[wasm_bindgen]
pub fn key_up(key: &str, now_ms: f64) -> Result<(), JsValue> {
    with_client(|c| {
        if let Some(key) = input::normalize_key(key) {
            c.session.key(key, false, now_ms);
        }
    })
}

#[wasm_bindgen]
pub fn hold(button: &str, pressed: bool) -> Result<(), JsValue> {
    let button = input::hold_button(button).ok_or_else(|| JsValue::from_str("unknown button"))?;
    with_client(|c| {
        c.session.hold(button, pressed);
    })
}

#[wasm_bindgen]
pub fn insert_coin() -> Result<(), JsValue> {
    with_client(|c| c.session.insert_coin())
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    with_client(|c| c.start())
}

#[wasm_bindgen]
pub fn toggle_pause() -> Result<bool, JsValue> {
    with_client(|c| c.session.toggle_pause())
}

/// Window blur or hidden tab
#[wasm_bindgen]
pub fn auto_pause() -> Result<(), JsValue> {
    with_client(|c| c.session.pause())
}

#[wasm_bindgen]
pub fn set_difficulty(name: &str) -> Result<(), JsValue> {
    let difficulty: Difficulty = name.parse().map_err(|e: proto::ProtoError| JsValue::from_str(&e.to_string()))?;
    with_client(|c| c.session.set_difficulty(difficulty))
}

#[wasm_bindgen]
pub fn set_muted(muted: bool) -> Result<(), JsValue> {
    with_client(|c| c.audio.set_muted(muted))
}

#[wasm_bindgen]
pub fn toggle_mute() -> Result<bool, JsValue> {
    with_client(|c| {
        let muted = !c.audio.muted();
        c.audio.set_muted(muted);
        muted
    })
}

#[wasm_bindgen]
pub fn toggle_camera() -> Result<bool, JsValue> {
    with_client(|c| {
        c.top_view = !c.top_view;
        c.top_view
    })
}

#[wasm_bindgen]
pub fn set_option(name: &str, enabled: bool) -> Result<(), JsValue> {
    with_client(|c| c.set_option(name, enabled))?
}

#[wasm_bindgen]
pub fn toggle_record(now_ms: f64) -> Result<bool, JsValue> {
    with_client(|c| c.session.toggle_record(now_ms))
}

#[wasm_bindgen]
pub fn toggle_play(now_ms: f64) -> Result<bool, JsValue> {
    with_client(|c| match c.session.toggle_play(now_ms) {
        Ok(playing) => playing,
        Err(err) => {
            c.toast(&err.to_string());
            false
        }
    })
}

#[wasm_bindgen]
pub fn set_replay_speed(speed: f64) -> Result<(), JsValue> {
    with_client(|c| c.session.set_replay_speed(speed))
}

#[wasm_bindgen]
pub fn save_replay() -> Result<bool, JsValue> {
    with_client(|c| c.save_replay())
}

#[wasm_bindgen]
pub fn load_replay() -> Result<bool, JsValue> {
    with_client(|c| c.load_replay())
}

#[wasm_bindgen]
pub fn reset_machine() -> Result<(), JsValue> {
    with_client(|c| {
        c.session.reset_machine();
        c.particles.clear();
    })
}

#[wasm_bindgen]
pub fn reset_high_score() -> Result<(), JsValue> {
    with_client(|c| {
        c.session.reset_high_score();
        proto::clear_high_score(&mut c.store);
    })
}

#[wasm_bindgen]
pub fn dismiss_instructions() -> Result<(), JsValue> {
    with_client(|c| {
        if let Some(hud) = &c.hud {
            hud.show_instructions(false);
        }
    })
}
