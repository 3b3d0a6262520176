//! Screen flow shared by the frontends.
//!
//! Picker -> Story -> AR overlay, with the overlay presented full-screen on
//! top of the story. Pure view state; the frontends map it to DOM nodes or
//! window contents.

use crate::locale::Language;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Picker,
    Story(Language),
    /// Full-screen AR overlay. `has_tapped` latches on the first tap and
    /// hides the instructional banner.
    ArOverlay { language: Language, has_tapped: bool },
}

#[derive(Clone, Debug)]
pub struct Flow {
    screen: Screen,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        Self {
            screen: Screen::Picker,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Picker selection routes to the story view for that language.
    pub fn select_language(&mut self, language: Language) {
        if self.screen == Screen::Picker {
            self.screen = Screen::Story(language);
        }
    }

    /// Story screen's call-to-action presents the AR overlay.
    pub fn open_ar(&mut self) {
        if let Screen::Story(language) = self.screen {
            self.screen = Screen::ArOverlay {
                language,
                has_tapped: false,
            };
        }
    }

    /// First tap anywhere in the overlay hides the hint banner. Latches;
    /// later taps are no-ops here.
    pub fn note_tap(&mut self) {
        if let Screen::ArOverlay { has_tapped, .. } = &mut self.screen {
            *has_tapped = true;
        }
    }

    /// Dismissing the overlay returns to the story view. The caller tears
    /// the AR session down alongside this.
    pub fn dismiss_ar(&mut self) {
        if let Screen::ArOverlay { language, .. } = self.screen {
            self.screen = Screen::Story(language);
        }
    }

    /// Back from the story view returns to the picker.
    pub fn back(&mut self) {
        if let Screen::Story(_) = self.screen {
            self.screen = Screen::Picker;
        }
    }

    pub fn hint_visible(&self) -> bool {
        matches!(
            self.screen,
            Screen::ArOverlay {
                has_tapped: false,
                ..
            }
        )
    }
}
