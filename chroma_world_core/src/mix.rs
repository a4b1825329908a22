use std::collections::BTreeMap;

use tracing::warn;

use crate::color::Color;

/// Represents errors raised while building a mix table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MixError {
    #[error(
        "Mix rule ({first}, {second}) already yields '{existing}', cannot also yield '{requested}'"
    )]
    ConflictingRule {
        first: String,
        second: String,
        existing: String,
        requested: String,
    },
}

/// The color mixing rules of a game.
///
/// Rules are keyed by an unordered pair of color names: registering `(red, blue)`
/// also answers lookups for `(blue, red)`. The table is built once at startup and
/// then only read, so it is shared by reference with everything that mixes colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMixTable {
    rules: BTreeMap<(String, String), Color>,
}

impl ColorMixTable {
    /// Creates an empty table. Every mix falls back to its left operand.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules the game ships with.
    pub fn classic() -> Self {
        let mut table = ColorMixTable::new();
        let rules = [
            ("blue", "green", Color::new("yellow", (255, 255, 0))),
            ("red", "blue", Color::new("purple", (128, 0, 128))),
            ("red", "green", Color::new("brown", (139, 69, 19))),
        ];
        for (first, second, result) in rules {
            table
                .register(first, second, result)
                .expect("classic mix rules are distinct");
        }
        table
    }

    /// Registers `first + second = result`.
    ///
    /// A pair may only ever map to one color. Registering the same rule twice is
    /// tolerated with a warning; registering a different result for a known pair
    /// (in either order) is rejected.
    pub fn register(
        &mut self,
        first: &str,
        second: &str,
        result: Color,
    ) -> Result<(), MixError> {
        if let Some(existing) = self.lookup(first, second) {
            if existing.is_equal_to(&result) {
                warn!(first, second, result = %result, "duplicate mix rule ignored");
                return Ok(());
            }
            return Err(MixError::ConflictingRule {
                first: first.to_string(),
                second: second.to_string(),
                existing: existing.name().to_string(),
                requested: result.name().to_string(),
            });
        }
        self.rules.insert(Self::key(first, second), result);
        Ok(())
    }

    /// Finds the color produced by mixing `first` and `second`, in either order.
    pub fn lookup(&self, first: &str, second: &str) -> Option<&Color> {
        self.rules.get(&Self::key(first, second))
    }

    /// Mixes two colors, falling back to `base` when no rule matches.
    pub fn mix(&self, base: &Color, added: &Color) -> Color {
        self.lookup(base.name(), added.name())
            .unwrap_or(base)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over the registered rules as `(first, second, result)`, in name
    /// order with `first <= second`.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &str, &Color)> {
        self.rules
            .iter()
            .map(|((first, second), result)| (first.as_str(), second.as_str(), result))
    }

    /// Orders a pair so `(a, b)` and `(b, a)` share one entry.
    fn key(first: &str, second: &str) -> (String, String) {
        if first <= second {
            (first.to_owned(), second.to_owned())
        } else {
            (second.to_owned(), first.to_owned())
        }
    }
}
