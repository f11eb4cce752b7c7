//! DOM heads-up display
//!
//! Every element is looked up by id and may be missing; a page without a
//! given widget simply does not get that readout.

use game_core::effects::{fps_color, key_label, TOAST_MS};
use game_core::GameState;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

const INPUT_VIZ_MS: i32 = 600;

pub struct Hud {
    document: Document,
}

impl Hud {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(&self, id: &str, visible: bool) {
        if let Some(el) = self.element(id).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            let _ = el
                .style()
                .set_property("display", if visible { "flex" } else { "none" });
        }
    }

    pub fn update(&self, state: &GameState) {
        self.set_text("score", &state.score.to_string());
        self.set_text("time", &state.display_time().to_string());
        self.set_text("high", &state.high_score.to_string());
        self.set_text("coins", &state.coins.to_string());
    }

    pub fn show_fps(&self, fps: u32) {
        if let Some(el) = self.element("fps").and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            el.set_text_content(Some(&format!("{fps} FPS")));
            let _ = el.style().set_property("color", fps_color(fps));
        }
    }

    pub fn show_overlay(&self, title: &str, body: &str) {
        self.set_text("overlay-title", title);
        self.set_text("overlay-body", body);
        self.set_visible("overlay", true);
    }

    pub fn hide_overlay(&self) {
        self.set_visible("overlay", false);
    }

    pub fn show_instructions(&self, visible: bool) {
        self.set_visible("instructions", visible);
    }

    pub fn set_recording(&self, active: bool) {
        self.set_visible("rec-indicator", active);
    }

    pub fn set_paused(&self, paused: bool) {
        self.set_visible("paused", paused);
    }

    /// Transient message that removes itself
    pub fn toast(&self, text: &str) {
        let Some(container) = self.element("toasts") else {
            return;
        };
        let Ok(toast) = self.document.create_element("div") else {
            return;
        };
        toast.set_class_name("toast");
        toast.set_text_content(Some(text));
        if container.append_child(&toast).is_err() {
            return;
        }
        remove_later(toast, TOAST_MS as i32);
    }

    /// Flash the key a replay just pressed
    pub fn show_replay_key(&self, key: &str, is_down: bool) {
        if !is_down {
            return;
        }
        let Some(viz) = self.element("input-viz") else {
            return;
        };
        let Ok(chip) = self.document.create_element("span") else {
            return;
        };
        chip.set_class_name("key");
        chip.set_text_content(Some(&key_label(key)));
        if viz.append_child(&chip).is_ok() {
            remove_later(chip, INPUT_VIZ_MS);
        }
    }
}

fn remove_later(element: Element, delay_ms: i32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        if element.parent_node().is_some() {
            element.remove();
        }
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms);
}
