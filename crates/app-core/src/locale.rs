//! Localized strings for the story screens.
//!
//! The language set is closed, so every lookup is an exhaustive match with
//! no fallback arm; a missing translation is unrepresentable.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Chinese,
    Tamil,
    Malay,
}

impl Language {
    /// Picker order.
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Chinese,
        Language::Tamil,
        Language::Malay,
    ];

    /// The language's own name, shown on the picker button and as the
    /// story screen title bar.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
            Language::Tamil => "தமிழ்",
            Language::Malay => "Bahasa Melayu",
        }
    }

    pub fn story_title(self) -> &'static str {
        match self {
            Language::English => "The Story of Redhill",
            Language::Chinese => "红山的故事",
            Language::Tamil => "ரெட்ஹில்லின் கதை",
            Language::Malay => "Kisah Redhill",
        }
    }

    pub fn story_body(self) -> &'static str {
        match self {
            Language::English => {
                "Once upon a time in Redhill, a boy with great strength saved his village \
                 from swordfish attacks. The king, fearing his power, had him killed. \
                 A red hill rose where his blood was spilled—hence the name Redhill."
            }
            Language::Chinese => {
                "很久以前，在红山，有一个拥有巨大力量的男孩，他拯救了村庄免受剑鱼袭击。\
                 国王因为害怕他的力量而下令杀死他。他流血的地方出现了一座红色的山丘，因此得名“红山”。"
            }
            Language::Tamil => {
                "Redhill இல் ஒரு சிறுவன் அற்புதமான சக்தியுடன் இருந்தான். அவன் தனது கிராமத்தை \
                 வாள் மீன்களின் தாக்குதலிலிருந்து காப்பாற்றினான். அரசன் அவனது சக்தியை பயந்து \
                 அவனை கொலை செய்தான். அவன் இரத்தம் சிந்திய இடத்தில் சிவந்த மலையொன்றை \
                 உருவாக்கியது. அதனால் அந்த இடம் 'Redhill' என அழைக்கப்பட்டது."
            }
            Language::Malay => {
                "Pada zaman dahulu di Redhill, seorang budak lelaki yang kuat menyelamatkan \
                 kampungnya daripada serangan ikan todak. Raja takut akan kekuatannya dan \
                 memerintahkan dia dibunuh. Di tempat darahnya tumpah, muncul sebuah bukit \
                 merah. Itulah asal usul nama Redhill."
            }
        }
    }

    /// Call-to-action on the story screen button that opens the AR overlay.
    pub fn ar_prompt(self) -> &'static str {
        match self {
            Language::English => "Explore in AR",
            Language::Chinese => "在 AR 中探索",
            Language::Tamil => "AR இல் ஆராயுங்கள்",
            Language::Malay => "Teroka dalam AR",
        }
    }
}

// Picker heading and AR hint banner are shown before a language is chosen
// (or over the camera view), so they stay in English like the original.
pub const PICKER_HEADING: &str = "Choose a Language";
pub const AR_HINT: &str = "Tap on a wall to start!";
