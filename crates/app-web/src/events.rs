use crate::input;
use crate::overlay;
use crate::platform;
use app_core::flow::Flow;
use app_core::session::ArSession;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct ArWiring {
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub flow: Rc<RefCell<Flow>>,
    pub session: Rc<RefCell<ArSession>>,
    pub audio: Rc<RefCell<platform::WebAudioSession>>,
    pub media: Rc<RefCell<platform::MediaPanel>>,
    pub active: Rc<Cell<bool>>,
    pub started: Instant,
}

/// Wire the tap gesture. Attached once at startup; the handler ignores
/// events while the overlay is not presented.
pub fn wire_tap_handler(w: ArWiring) {
    let canvas = w.canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !w.active.get() {
            return;
        }
        // First tap hides the hint banner whether or not a wall was hit.
        w.flow.borrow_mut().note_tap();
        if !w.flow.borrow().hint_visible() {
            overlay::hide(&w.document);
        }

        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let tracker = platform::PreviewWallTracker::for_canvas(&w.canvas);
        let now_sec = w.started.elapsed().as_secs_f64();
        w.session.borrow_mut().handle_tap(
            pos,
            now_sec,
            &tracker,
            &platform::BundledAssets,
            &mut *w.audio.borrow_mut(),
            &mut *w.media.borrow_mut(),
        );
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    let _ = canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    closure.forget();
}
