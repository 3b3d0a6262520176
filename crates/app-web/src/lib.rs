#![cfg(target_arch = "wasm32")]
//! Web front-end: DOM screens for the picker and story views, plus the
//! WebGPU-rendered AR overlay.

use app_core::flow::{Flow, Screen};
use app_core::session::ArSession;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod platform;
mod render;
mod ui;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("app-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("ar-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #ar-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let flow = Rc::new(RefCell::new(Flow::new()));
    let session = Rc::new(RefCell::new(ArSession::new(js_sys::Date::now() as u64)));
    let audio = Rc::new(RefCell::new(platform::WebAudioSession::default()));
    let media = Rc::new(RefCell::new(platform::MediaPanel::default()));
    let active = Rc::new(Cell::new(false));
    let started = Instant::now();

    ui::show_picker(&document);

    // Picker buttons route to the story view.
    {
        let document_pick = document.clone();
        let flow_pick = flow.clone();
        ui::build_picker(&document, move |lang| {
            flow_pick.borrow_mut().select_language(lang);
            ui::show_story(&document_pick, lang);
            log::info!("[picker] selected {:?}", lang);
        })?;
    }

    // Back to the picker from the story view.
    {
        let document_back = document.clone();
        let flow_back = flow.clone();
        dom::add_click_listener(&document, "story-back", move || {
            flow_back.borrow_mut().back();
            ui::show_picker(&document_back);
        });
    }

    // The story call-to-action presents the AR overlay and spins up the
    // session, the GPU surface, and the drive loop.
    {
        let document_ar = document.clone();
        let flow_ar = flow.clone();
        let session_ar = session.clone();
        let active_ar = active.clone();
        let canvas_ar = canvas.clone();
        dom::add_click_listener(&document, "story-ar-button", move || {
            flow_ar.borrow_mut().open_ar();
            ui::show_ar(&document_ar);
            dom::sync_canvas_backing_size(&canvas_ar);

            // Fresh session per overlay presentation.
            *session_ar.borrow_mut() = ArSession::new(js_sys::Date::now() as u64);
            active_ar.set(true);

            let session_loop = session_ar.clone();
            let active_loop = active_ar.clone();
            let canvas_loop = canvas_ar.clone();
            spawn_local(async move {
                let gpu = frame::init_gpu(&canvas_loop).await;
                let ctx = Rc::new(RefCell::new(frame::FrameContext {
                    session: session_loop,
                    assets: platform::BundledAssets,
                    canvas: canvas_loop,
                    gpu,
                    started,
                    active: active_loop,
                }));
                frame::start_loop(ctx);
            });
        });
    }

    // Dismissing the overlay tears the session down and stops the loop.
    {
        let document_close = document.clone();
        let flow_close = flow.clone();
        let session_close = session.clone();
        let active_close = active.clone();
        let media_close = media.clone();
        dom::add_click_listener(&document, "ar-close", move || {
            flow_close.borrow_mut().dismiss_ar();
            active_close.set(false);
            session_close.borrow_mut().shutdown();
            media_close.borrow_mut().stop();
            if let Screen::Story(lang) = flow_close.borrow().screen() {
                ui::show_story(&document_close, lang);
            }
            log::info!("[overlay] dismissed");
        });
    }

    events::wire_tap_handler(events::ArWiring {
        canvas,
        document,
        flow,
        session,
        audio,
        media,
        active,
        started,
    });

    Ok(())
}
