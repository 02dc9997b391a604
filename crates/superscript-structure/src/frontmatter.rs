//! Frontmatter: the metadata block before the first heading of a script.
//!
//! ```text
//! My Script: Issue One          ← title, always the first non-empty line
//! Written by Jane Doe           ← writer
//! characters: Alice, Bob        ← key: value
//!   Carol                       ← continuation of the previous value
//! language: en-US (English)     ← reduced to "en-US"
//!
//! PAGE 1                        ← first heading, body starts here
//! ```

use crate::classify::is_first_heading;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use superscript_core::{Delta, Document};

/// Keys with a meaning of their own; everything else is kept verbatim as an extra.
pub const SPECIAL_ATTRIBUTES: [&str; 12] = [
    "address",
    "characters",
    "copyright",
    "draft",
    "email",
    "issue",
    "language",
    "series",
    "title",
    "vocabulary",
    "volume",
    "writer",
];

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?: {2}|\t)\s*\S").expect("valid regex"));
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+?)\s*:\s*(.*\S)?\s*$").expect("valid regex"));
static WRITTEN_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:written )?by\s*(.*)$").expect("valid regex"));
static LOCALE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]{2,3}(?:-[a-z0-9]{2,3})?$").expect("valid regex"));
static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+):\s*(.*)$").expect("valid regex"));
static VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s+\S").expect("valid regex"));

/// Parsed frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    title: String,
    entries: Vec<(String, String)>,
    characters: Vec<String>,
    vocabulary: Vec<String>,
}

impl Attributes {
    /// The script title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Value of `key` (lowercase). Keys written without a value map to `""`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == "title" {
            return Some(&self.title);
        }
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if `key` is present with a non-empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// The writer, from `writer:` or a `Written by` line.
    pub fn writer(&self) -> Option<&str> {
        self.get("writer").filter(|v| !v.is_empty())
    }

    /// The script locale code (`en-US`), when one was given.
    pub fn language(&self) -> Option<&str> {
        self.get("language").filter(|v| !v.is_empty())
    }

    /// Character names from the `characters` list.
    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    /// Terms from the `vocabulary` list.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// All keys in the order they were written (title excluded).
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys without a special meaning, in the order they were written.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries().filter(|(k, _)| !SPECIAL_ATTRIBUTES.contains(k))
    }

    /// Regenerate a frontmatter block: title first, then keys in their original order.
    ///
    /// List values are joined with `, ` and multi-line values are written as indented
    /// continuation lines.
    pub fn to_frontmatter_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for (key, value) in &self.entries {
            let value = match key.as_str() {
                "characters" => self.characters.join(", "),
                "vocabulary" => self.vocabulary.join(", "),
                _ => value.clone(),
            };
            let mut lines = value.lines();
            match lines.next() {
                Some(first) => out.push_str(&format!("{key}: {first}\n")),
                None => out.push_str(&format!("{key}:\n")),
            }
            for line in lines {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    fn append(&mut self, key: &str, line: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) if !existing.is_empty() => {
                existing.push('\n');
                existing.push_str(line);
            }
            _ => self.set(key, line.to_string()),
        }
    }
}

/// Frontmatter input: raw text, or a document whose frontmatter lines are flagged.
#[derive(Debug, Clone, Copy)]
pub enum FrontmatterSource<'a> {
    /// The raw block.
    Text(&'a str),
    /// Lines of a document carrying the frontmatter format.
    Document(&'a Document),
}

impl<'a> From<&'a str> for FrontmatterSource<'a> {
    fn from(text: &'a str) -> Self {
        FrontmatterSource::Text(text)
    }
}

impl<'a> From<&'a String> for FrontmatterSource<'a> {
    fn from(text: &'a String) -> Self {
        FrontmatterSource::Text(text)
    }
}

impl<'a> From<&'a Document> for FrontmatterSource<'a> {
    fn from(document: &'a Document) -> Self {
        FrontmatterSource::Document(document)
    }
}

/// Parse a frontmatter block.
///
/// Never fails: lines that are neither `key: value`, `Written by ...` nor continuations are
/// ignored.
pub fn parse_frontmatter<'a>(source: impl Into<FrontmatterSource<'a>>) -> Attributes {
    match source.into() {
        FrontmatterSource::Text(text) => parse_lines(text.lines()),
        FrontmatterSource::Document(document) => {
            let lines: Vec<String> = document
                .lines()
                .filter(|line| line.format.frontmatter)
                .map(|line| line.text)
                .collect();
            parse_lines(lines.iter().map(String::as_str))
        }
    }
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Attributes {
    let mut attributes = Attributes::default();
    let mut lines = lines.skip_while(|line| line.trim().is_empty());
    if let Some(title) = lines.next() {
        attributes.title = title.trim().to_string();
    }

    let mut last_key: Option<String> = None;
    for line in lines {
        if CONTINUATION.is_match(line) {
            if let Some(key) = &last_key {
                attributes.append(key, line.trim());
            }
            continue;
        }

        if let Some(caps) = KEY_VALUE.captures(line) {
            let key = caps[1].trim().to_lowercase();
            let value = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            // The first line already set the title.
            if key == "title" {
                last_key = None;
                continue;
            }
            attributes.set(&key, value);
            last_key = Some(key);
        } else if let Some(caps) = WRITTEN_BY.captures(line) {
            attributes.set("writer", caps[1].trim().to_string());
            last_key = Some("writer".to_string());
        }
    }

    if let Some(characters) = attributes.get("characters") {
        attributes.characters = split_list(characters);
    }
    if let Some(vocabulary) = attributes.get("vocabulary") {
        attributes.vocabulary = split_list(vocabulary);
    }
    if let Some(code) = attributes.get("language").and_then(locale_code) {
        attributes.set("language", code);
    }

    attributes
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn locale_code(value: &str) -> Option<String> {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .find(|token| LOCALE_TOKEN.is_match(token))
        .map(str::to_string)
}

/// The frontmatter block of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterSplit {
    /// Char offset of the first heading line, `None` when the whole document is frontmatter.
    pub first_heading_index: Option<usize>,
    /// Text before the first heading.
    pub text: String,
}

impl FrontmatterSplit {
    /// Returns `true` if `offset` lies before the first heading.
    pub fn contains(&self, offset: usize) -> bool {
        self.first_heading_index.is_none_or(|first| offset < first)
    }
}

/// Locate the frontmatter block of `document`.
pub fn split_frontmatter(document: &Document) -> FrontmatterSplit {
    let first = document.lines().find(|line| is_first_heading(&line.text));
    match first {
        Some(line) => FrontmatterSplit {
            first_heading_index: Some(line.start),
            text: document.slice(0, line.start),
        },
        None => FrontmatterSplit {
            first_heading_index: None,
            text: document.text(),
        },
    }
}

/// Split a raw script into its frontmatter and body.
pub fn split_script(raw: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if is_first_heading(line.trim_end_matches(['\n', '\r'])) {
            return raw.split_at(offset);
        }
        offset += line.len();
    }
    (raw, "")
}

/// A script split into frontmatter and body, with its parsed attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script<'a> {
    /// Frontmatter block.
    pub frontmatter: &'a str,
    /// Everything from the first heading on.
    pub content: &'a str,
    /// Parsed frontmatter.
    pub attributes: Attributes,
}

impl<'a> Script<'a> {
    /// Split and parse `raw`.
    pub fn parse(raw: &'a str) -> Self {
        let (frontmatter, content) = split_script(raw);
        Self {
            frontmatter,
            content,
            attributes: parse_frontmatter(frontmatter),
        }
    }
}

/// Title line written when a key is added to a script that has none.
pub const UNTITLED: &str = "Untitled";

/// Delta that adds `value` to the list under `key`, creating the key line when missing.
///
/// Returns an empty delta when the value is already listed. A script without a title gets an
/// [`UNTITLED`] line first, so the new key is never read as the title.
pub fn append_frontmatter_value(document: &Document, key: &str, value: &str) -> Delta {
    let split = split_frontmatter(document);
    let already_listed = split_list(
        parse_frontmatter(split.text.as_str())
            .get(&key.to_lowercase())
            .unwrap_or_default(),
    )
    .iter()
    .any(|item| item == value);
    if already_listed {
        return Delta::new();
    }

    let end_line = match split.first_heading_index {
        Some(first) => document.line_at(first).map_or(0, |(line, _)| line),
        None => document.line_count(),
    };

    let mut key_end: Option<(usize, bool)> = None;
    let mut last_non_blank: Option<usize> = None;
    let mut title_seen = false;
    for line in document.lines().take(end_line) {
        let line_end = line.start + line.len();
        // The title line never defines a key.
        let is_title = !title_seen && !line.text.trim().is_empty();
        title_seen |= is_title;
        let key_line = (!is_title)
            .then(|| KEY_LINE.captures(&line.text))
            .flatten();
        if let Some(caps) = key_line {
            if key_end.is_some() {
                break;
            }
            if caps[1].eq_ignore_ascii_case(key) {
                key_end = Some((line_end, caps[2].trim().is_empty()));
            }
        } else if VALUE_LINE.is_match(&line.text) {
            if let Some((end, empty)) = key_end.as_mut() {
                *end = line_end;
                *empty = false;
            }
        } else if key_end.is_some() {
            break;
        }
        if title_seen && !line.is_empty() {
            last_non_blank = Some(line_end);
        }
    }

    match (key_end, last_non_blank) {
        (Some((at, empty)), _) => {
            let text = if empty {
                format!(" {value}")
            } else {
                format!(", {value}")
            };
            Delta::new().retain(at).insert(text)
        }
        (None, Some(at)) => Delta::new().retain(at).insert(format!("\n{key}: {value}")),
        (None, None) => Delta::new().insert(format!("{UNTITLED}\n{key}: {value}\n")),
    }
}

/// Single words to teach a spellchecker: every word of every character name and term.
pub fn learned_words(attributes: &Attributes) -> Vec<String> {
    let mut seen = HashSet::new();
    attributes
        .characters()
        .iter()
        .chain(attributes.vocabulary())
        .flat_map(|entry| entry.split_whitespace())
        .filter(|word| seen.insert(word.to_string()))
        .map(str::to_string)
        .collect()
}

/// Words to learn and unlearn when the frontmatter lists change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordListDiff {
    /// Newly listed words.
    pub learn: Vec<String>,
    /// Words no longer listed.
    pub unlearn: Vec<String>,
}

impl WordListDiff {
    /// Compare two learned word lists.
    pub fn between(old: &[String], new: &[String]) -> Self {
        Self {
            learn: new.iter().filter(|w| !old.contains(w)).cloned().collect(),
            unlearn: old.iter().filter(|w| !new.contains(w)).cloned().collect(),
        }
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.learn.is_empty() && self.unlearn.is_empty()
    }
}
