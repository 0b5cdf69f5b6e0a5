//! Caption storage shapes and language bookkeeping.
//!
//! Captions were first stored as a single string (or a `{format, srt|text}`
//! object) in the video's source language, and later as a mapping from language
//! code to a per-language payload. Both shapes are accepted; detection never
//! fails.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Top-level keys that mark the single-language object shape.
const LEGACY_KEYS: [&str; 4] = ["srt", "text", "content", "format"];

/// Languages the translation service accepts.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("sv", "Swedish"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

pub fn supported_languages() -> Vec<Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| Language {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Captions as stored on a video.
#[derive(Debug, Clone, PartialEq)]
pub enum Captions {
    /// A bare caption string (SRT or plain text) in the source language.
    Plain(String),
    /// `{format, srt, text, content}` object in the source language.
    Legacy(Map<String, Value>),
    /// Language code to payload (string or object).
    MultiLanguage(BTreeMap<String, Value>),
    /// Any other JSON. Carries no languages.
    Unrecognized(Value),
}

impl Captions {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Captions::Plain(s),
            Value::Object(map) => {
                if LEGACY_KEYS.iter().any(|k| map.contains_key(*k)) {
                    Captions::Legacy(map)
                } else {
                    Captions::MultiLanguage(map.into_iter().collect())
                }
            }
            other => Captions::Unrecognized(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Captions::Plain(s) => Value::String(s.clone()),
            Captions::Legacy(map) => Value::Object(map.clone()),
            Captions::MultiLanguage(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            Captions::Unrecognized(v) => v.clone(),
        }
    }

    /// Language codes present. Single-language shapes report `recorded_language`
    /// (or English when unset), unless their text is blank.
    pub fn languages(&self, recorded_language: Option<&str>) -> BTreeSet<String> {
        match self {
            Captions::Plain(_) | Captions::Legacy(_) if self.single_text().is_none() => {
                BTreeSet::new()
            }
            Captions::Plain(_) | Captions::Legacy(_) => {
                let lang = recorded_language
                    .filter(|l| !l.is_empty())
                    .unwrap_or(DEFAULT_LANGUAGE);
                BTreeSet::from([lang.to_string()])
            }
            Captions::MultiLanguage(map) => map
                .iter()
                .filter(|(_, v)| v.is_string() || v.is_object())
                .map(|(k, _)| k.clone())
                .collect(),
            Captions::Unrecognized(_) => BTreeSet::new(),
        }
    }

    /// Caption text for `language`, or the single-language text. Blank text is `None`.
    pub fn primary_text(&self, language: &str) -> Option<&str> {
        match self {
            Captions::Plain(_) | Captions::Legacy(_) => self.single_text(),
            Captions::MultiLanguage(map) => match map.get(language)? {
                Value::String(s) => non_blank(s),
                Value::Object(inner) => payload_text(inner),
                _ => None,
            },
            Captions::Unrecognized(_) => None,
        }
    }

    fn single_text(&self) -> Option<&str> {
        match self {
            Captions::Plain(s) => non_blank(s),
            Captions::Legacy(map) => payload_text(map),
            _ => None,
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

fn payload_text(map: &Map<String, Value>) -> Option<&str> {
    ["srt", "text", "content"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str).and_then(non_blank))
}

impl Serialize for Captions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Captions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Captions::from_value)
    }
}

/// Languages that already have captions. Absent captions yield an empty set.
pub fn existing_languages(
    captions: Option<&Captions>,
    recorded_language: Option<&str>,
) -> BTreeSet<String> {
    captions
        .map(|c| c.languages(recorded_language))
        .unwrap_or_default()
}

/// Supported languages still eligible for translation, in supported-list order.
pub fn translation_targets(
    supported: &[Language],
    existing: &BTreeSet<String>,
    source: &str,
) -> Vec<String> {
    supported
        .iter()
        .map(|l| l.code.as_str())
        .filter(|code| *code != source && !existing.contains(*code))
        .map(str::to_string)
        .collect()
}

/// Multi-select over the supported languages, pre-selected with the existing ones.
#[derive(Debug, Clone)]
pub struct LanguageSelection {
    supported: Vec<Language>,
    existing: BTreeSet<String>,
    source: String,
    selected: BTreeSet<String>,
}

impl LanguageSelection {
    /// `source` is the language translations are made from; it is never a target.
    pub fn new(supported: Vec<Language>, existing: BTreeSet<String>, source: &str) -> Self {
        let selected = existing.clone();
        Self {
            supported,
            existing,
            source: source.to_string(),
            selected,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn supported(&self) -> &[Language] {
        &self.supported
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selected.contains(code)
    }

    pub fn all_selected(&self) -> bool {
        self.supported.iter().all(|l| self.selected.contains(&l.code))
    }

    pub fn select_all(&mut self) {
        self.selected = self.supported.iter().map(|l| l.code.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn toggle(&mut self, code: &str) {
        if !self.selected.remove(code) {
            self.selected.insert(code.to_string());
        }
    }

    pub fn select(&mut self, code: &str) {
        self.selected.insert(code.to_string());
    }

    pub fn deselect(&mut self, code: &str) {
        self.selected.remove(code);
    }

    /// Selected languages minus the existing ones and the source.
    pub fn to_translate(&self) -> Vec<String> {
        self.supported
            .iter()
            .map(|l| l.code.as_str())
            .filter(|code| {
                self.selected.contains(*code)
                    && !self.existing.contains(*code)
                    && *code != self.source
            })
            .map(str::to_string)
            .collect()
    }
}

static SRT_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid SRT index pattern"));
static SRT_TIMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-->\s").expect("valid SRT timing pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Rough transcript from SRT: drops cue numbers and timing lines.
pub fn transcript_from_srt(srt: &str) -> String {
    let joined = srt
        .split('\n')
        .filter(|line| !SRT_INDEX.is_match(line.trim()))
        .filter(|line| !SRT_TIMING.is_match(line))
        .collect::<Vec<_>>()
        .join(" ");
    WHITESPACE.replace_all(&joined, " ").trim().to_string()
}
