use std::cell::RefCell;
use std::rc::Rc;

use app_core::{constants, Camera, DeformationEngine, StretchTracker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::audio::AudioRig;
use crate::input::{self, MouseState};

pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub engine: Rc<RefCell<DeformationEngine>>,
    pub camera: Rc<RefCell<Camera>>,
    pub mouse: Rc<RefCell<MouseState>>,
    pub stretch: Rc<RefCell<StretchTracker>>,
    pub audio: Rc<AudioRig>,
}

pub fn wire_input_handlers(w: InputWiring) {
    // pointermove: track position; while grabbed, drive the stretch cues.
    // The deformation itself runs in the frame loop, throttled there.
    {
        let mouse_m = w.mouse.clone();
        let stretch_m = w.stretch.clone();
        let engine_m = w.engine.clone();
        let audio_m = w.audio.clone();
        let canvas_m = w.canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let px = input::pointer_viewport_px(&ev);
            let ndc = input::pointer_ndc(&ev, &canvas_m);
            {
                let mut ms = mouse_m.borrow_mut();
                ms.px = px;
                ms.ndc = ndc;
            }
            if engine_m.borrow().is_grabbed() && stretch_m.borrow_mut().update(px) {
                audio_m.play_stretch();
            }
        }) as Box<dyn FnMut(_)>);
        if let Some(wnd) = web::window() {
            let _ = wnd
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }

    // pointerdown: resolve the contact point and begin the grab
    {
        let mouse_m = w.mouse.clone();
        let stretch_m = w.stretch.clone();
        let engine_m = w.engine.clone();
        let camera_m = w.camera.clone();
        let audio_m = w.audio.clone();
        let canvas_m = w.canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            audio_m.unlock();
            let px = input::pointer_viewport_px(&ev);
            let ndc = input::pointer_ndc(&ev, &canvas_m);
            {
                let mut ms = mouse_m.borrow_mut();
                ms.px = px;
                ms.ndc = ndc;
                ms.down = true;
            }
            let mut engine = engine_m.borrow_mut();
            let camera = camera_m.borrow();
            if let Some(hit) = engine.pick(&camera, ndc) {
                engine.grab_start(hit);
                stretch_m.borrow_mut().begin(px);
                // deform immediately so the surface reacts on the press itself
                if let Some(drag) = engine.resolve_drag(&camera, ndc) {
                    engine.apply(drag);
                }
                let _ = canvas_m.set_pointer_capture(ev.pointer_id());
                ev.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointerup: end the grab, decide whether the release cue plays
    {
        let mouse_m = w.mouse.clone();
        let stretch_m = w.stretch.clone();
        let engine_m = w.engine.clone();
        let audio_m = w.audio.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let px = input::pointer_viewport_px(&ev);
            mouse_m.borrow_mut().down = false;
            let mut engine = engine_m.borrow_mut();
            if engine.is_grabbed() {
                let released_far = stretch_m.borrow_mut().finish(
                    px,
                    input::viewport_center(),
                    constants::RELEASE_DISTANCE_THRESHOLD,
                );
                if released_far {
                    audio_m.play_release();
                }
                engine.grab_end();
                ev.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        if let Some(wnd) = web::window() {
            let _ =
                wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }
}
