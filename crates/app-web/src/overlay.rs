//! The "tap on a wall" hint banner shown over the camera view until the
//! first tap.

use web_sys as web;

const HINT_ID: &str = "ar-hint";

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_ID) {
        let _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_ID) {
        let _ = el.set_attribute("style", "display:none");
    }
}
