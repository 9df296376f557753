use std::cell::RefCell;
use std::rc::Rc;

use app_core::{constants, ColorWheel, DeformationEngine};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::audio::AudioRig;
use crate::dom;
use crate::lighting::LightingRig;
use crate::model::ModelRig;

// Letters that light the model when hovered; the rest stay dark.
const LIT_LETTERS: [&str; 4] = ["I", "L", "U", "K"];

pub struct UiWiring {
    pub document: web::Document,
    pub engine: Rc<RefCell<DeformationEngine>>,
    pub model: Rc<RefCell<ModelRig>>,
    pub lighting: Rc<RefCell<LightingRig>>,
    pub audio: Rc<AudioRig>,
    pub disco: Rc<RefCell<bool>>,
}

/// Wire the buttons and letter hover handlers. Returns the letter elements
/// so the frame loop can animate them in disco mode.
pub fn wire_ui(w: UiWiring) -> Vec<web::HtmlElement> {
    {
        let audio = w.audio.clone();
        dom::add_click_listener(&w.document, "sound-button", move || audio.button_pressed());
    }

    {
        let audio = w.audio.clone();
        let lighting = w.lighting.clone();
        let disco = w.disco.clone();
        let document = w.document.clone();
        dom::add_click_listener(&w.document, "disco-button", move || {
            let on = {
                let mut d = disco.borrow_mut();
                *d = !*d;
                *d
            };
            lighting.borrow_mut().set_disco(on);
            audio.set_drone(on);
            if let Some(el) = document.get_element_by_id("disco-button") {
                let _ = el.class_list().toggle_with_force("active", on);
            }
            if !on {
                reset_letter_styles(&document);
            }
        });
    }

    {
        let engine = w.engine.clone();
        let model = w.model.clone();
        let document = w.document.clone();
        dom::add_click_listener(&w.document, "model-switch-button", move || {
            let switched = model
                .borrow_mut()
                .toggle_detail(&mut engine.borrow_mut());
            if switched {
                if let Some(el) = document.get_element_by_id("model-switch-button") {
                    let _ = el.class_list().toggle("active");
                }
            }
        });
    }

    let letters = collect_letters(&w.document);
    for letter in &letters {
        let lit = letter
            .get_attribute("data-letter")
            .map(|l| LIT_LETTERS.contains(&l.as_str()))
            .unwrap_or(false);
        let lighting_enter = w.lighting.clone();
        let enter = Closure::wrap(Box::new(move || {
            lighting_enter.borrow_mut().set_letter_hover(lit);
        }) as Box<dyn FnMut()>);
        let _ =
            letter.add_event_listener_with_callback("pointerenter", enter.as_ref().unchecked_ref());
        enter.forget();

        let lighting_leave = w.lighting.clone();
        let leave = Closure::wrap(Box::new(move || {
            lighting_leave.borrow_mut().set_letter_hover(false);
        }) as Box<dyn FnMut()>);
        let _ =
            letter.add_event_listener_with_callback("pointerleave", leave.as_ref().unchecked_ref());
        leave.forget();
    }
    letters
}

fn collect_letters(document: &web::Document) -> Vec<web::HtmlElement> {
    let mut out = Vec::new();
    if let Ok(list) = document.query_selector_all(".letter") {
        for i in 0..list.length() {
            if let Some(node) = list.item(i) {
                if let Ok(el) = node.dyn_into::<web::HtmlElement>() {
                    out.push(el);
                }
            }
        }
    }
    out
}

/// Disco color cycling for the title letters, throttled to spare the DOM.
/// Returns the timestamp of the last applied update.
pub fn animate_letters(
    letters: &[web::HtmlElement],
    wheel: &ColorWheel,
    time_ms: f64,
    last_ms: f64,
) -> f64 {
    if time_ms - last_ms < constants::LETTER_THROTTLE_MS {
        return last_ms;
    }
    for (i, letter) in letters.iter().enumerate() {
        let hue = time_ms as f32 * constants::DISCO_LETTER_HUE_SPEED + i as f32 * 0.07;
        let [r, g, b] = wheel.sample(hue);
        let css = format!(
            "rgb({}, {}, {})",
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8
        );
        let _ = letter.style().set_property("color", &css);
    }
    time_ms
}

pub fn reset_letter_styles(document: &web::Document) {
    for letter in collect_letters(document) {
        let _ = letter.style().remove_property("color");
    }
}
