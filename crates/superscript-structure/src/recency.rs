//! Recently introduced character names, used to resolve `:` and `::` shorthand headings.

/// Character names in order of last introduction, most recent last.
///
/// Names compare case-insensitively. A name that moves keeps the spelling of that touch; a
/// repeat touch of the most recent name keeps its first spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterRecency {
    names: Vec<String>,
}

impl CharacterRecency {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `name`, moving it to the most recent position.
    ///
    /// Touching the name that is already most recent is a no-op. Blank names are ignored.
    pub fn touch(&mut self, name: &str) {
        let key = name.trim();
        if key.is_empty() {
            return;
        }
        if self.names.last().is_some_and(|last| same_name(last, key)) {
            return;
        }
        self.names.retain(|existing| !same_name(existing, key));
        self.names.push(name.to_string());
    }

    /// The `n`th most recent name, `1` being the most recent.
    pub fn nth_most_recent(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        let index = self.names.len().checked_sub(n)?;
        self.names.get(index).map(String::as_str)
    }

    /// The most recent name.
    pub fn most_recent(&self) -> Option<&str> {
        self.nth_most_recent(1)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name has been seen.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names from least to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
