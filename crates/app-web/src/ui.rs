//! DOM screens: the language picker, the story view, and screen switching.

use app_core::locale::{Language, AR_HINT, PICKER_HEADING};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

pub const PICKER_SCREEN: &str = "picker-screen";
pub const STORY_SCREEN: &str = "story-screen";
pub const AR_SCREEN: &str = "ar-screen";

/// Populate the picker: one button per language, wired to `on_pick`.
pub fn build_picker(
    document: &web::Document,
    on_pick: impl Fn(Language) + Clone + 'static,
) -> anyhow::Result<()> {
    dom::set_text(document, "picker-heading", PICKER_HEADING);
    let list = document
        .get_element_by_id("picker-list")
        .ok_or_else(|| anyhow::anyhow!("missing #picker-list"))?;

    for lang in Language::ALL {
        let button = document
            .create_element("button")
            .map_err(|e| anyhow::anyhow!("create button: {e:?}"))?;
        button.set_text_content(Some(lang.native_name()));
        let _ = button.set_attribute("class", "picker-button");

        let on_pick = on_pick.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            on_pick(lang);
        }) as Box<dyn FnMut()>);
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();

        list.append_child(&button)
            .map_err(|e| anyhow::anyhow!("append button: {e:?}"))?;
    }
    Ok(())
}

/// Fill the story screen with the selected language's strings.
pub fn populate_story(document: &web::Document, language: Language) {
    dom::set_text(document, "story-language", language.native_name());
    dom::set_text(document, "story-title", language.story_title());
    dom::set_text(document, "story-body", language.story_body());
    dom::set_text(document, "story-ar-button", language.ar_prompt());
}

pub fn show_picker(document: &web::Document) {
    dom::show(document, PICKER_SCREEN);
    dom::hide(document, STORY_SCREEN);
    dom::hide(document, AR_SCREEN);
}

pub fn show_story(document: &web::Document, language: Language) {
    populate_story(document, language);
    dom::hide(document, PICKER_SCREEN);
    dom::show(document, STORY_SCREEN);
    dom::hide(document, AR_SCREEN);
}

/// Present the AR overlay full-screen with the hint banner visible.
pub fn show_ar(document: &web::Document) {
    dom::set_text(document, "ar-hint", AR_HINT);
    dom::hide(document, PICKER_SCREEN);
    dom::hide(document, STORY_SCREEN);
    dom::show(document, AR_SCREEN);
    crate::overlay::show(document);
}
