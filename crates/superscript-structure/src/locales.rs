//! Locales offered on the frontmatter `language:` line.

/// A locale code and its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// BCP 47 code (`en-US`).
    pub key: &'static str,
    /// English display name.
    pub name: &'static str,
}

impl Locale {
    /// Returns `true` if `term` (lowercase) occurs in the code or the name.
    pub fn matches(&self, term: &str) -> bool {
        self.key.to_lowercase().contains(term) || self.name.to_lowercase().contains(term)
    }

    /// `en-US (English (United States))`
    pub fn label(&self) -> String {
        format!("{} ({})", self.key, self.name)
    }
}

macro_rules! locales {
    ($($key:literal => $name:literal,)*) => {
        &[$(Locale { key: $key, name: $name },)*]
    };
}

/// Built-in locale table.
pub static LOCALES: &[Locale] = locales! {
    "af" => "Afrikaans",
    "ar" => "Arabic",
    "bg" => "Bulgarian",
    "ca" => "Catalan",
    "cs" => "Czech",
    "cy" => "Welsh",
    "da" => "Danish",
    "de" => "German",
    "de-AT" => "German (Austria)",
    "de-CH" => "German (Switzerland)",
    "de-DE" => "German (Germany)",
    "el" => "Greek",
    "en" => "English",
    "en-AU" => "English (Australia)",
    "en-CA" => "English (Canada)",
    "en-GB" => "English (United Kingdom)",
    "en-IE" => "English (Ireland)",
    "en-NZ" => "English (New Zealand)",
    "en-US" => "English (United States)",
    "en-ZA" => "English (South Africa)",
    "es" => "Spanish",
    "es-ES" => "Spanish (Spain)",
    "es-MX" => "Spanish (Mexico)",
    "es-419" => "Spanish (Latin America)",
    "et" => "Estonian",
    "fa" => "Persian",
    "fi" => "Finnish",
    "fo" => "Faroese",
    "fr" => "French",
    "fr-CA" => "French (Canada)",
    "fr-CH" => "French (Switzerland)",
    "fr-FR" => "French (France)",
    "he" => "Hebrew",
    "hi" => "Hindi",
    "hr" => "Croatian",
    "hu" => "Hungarian",
    "hy" => "Armenian",
    "id" => "Indonesian",
    "it" => "Italian",
    "it-IT" => "Italian (Italy)",
    "ja" => "Japanese",
    "ko" => "Korean",
    "lt" => "Lithuanian",
    "lv" => "Latvian",
    "nb" => "Norwegian Bokmål",
    "nl" => "Dutch",
    "nl-NL" => "Dutch (Netherlands)",
    "nn" => "Norwegian Nynorsk",
    "pl" => "Polish",
    "pt" => "Portuguese",
    "pt-BR" => "Portuguese (Brazil)",
    "pt-PT" => "Portuguese (Portugal)",
    "ro" => "Romanian",
    "ru" => "Russian",
    "sk" => "Slovak",
    "sl" => "Slovenian",
    "sq" => "Albanian",
    "sr" => "Serbian",
    "sv" => "Swedish",
    "ta" => "Tamil",
    "tr" => "Turkish",
    "uk" => "Ukrainian",
    "vi" => "Vietnamese",
    "zh-CN" => "Chinese (China)",
    "zh-TW" => "Chinese (Taiwan)",
};

/// Locales whose code or name contains `term`, case-insensitively.
pub fn search(term: &str) -> impl Iterator<Item = &'static Locale> {
    let term = term.trim().to_lowercase();
    LOCALES.iter().filter(move |locale| locale.matches(&term))
}

/// Look up a locale by exact code.
pub fn find(key: &str) -> Option<&'static Locale> {
    LOCALES
        .iter()
        .find(|locale| locale.key.eq_ignore_ascii_case(key))
}
