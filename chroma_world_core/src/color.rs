use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::mix::ColorMixTable;

/// A named color with an RGB display attribute.
///
/// Two colors are the same color when their names match, case-sensitively.
/// The RGB triple is only used for drawing and never takes part in comparisons,
/// so `Color::new("red", (255, 0, 0))` and `Color::new("red", (9, 9, 9))` are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    name: String,
    rgb: (u8, u8, u8),
}

impl Color {
    pub fn new(name: impl Into<String>, rgb: (u8, u8, u8)) -> Self {
        Color {
            name: name.into(),
            rgb,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb
    }

    /// Returns `true` if both colors carry the same name.
    #[inline]
    pub fn is_equal_to(&self, other: &Color) -> bool {
        self.name == other.name
    }

    /// Mixes `self` with `other` using the rules in `table`.
    ///
    /// The pair is looked up in either order. When no rule exists the result is
    /// `self` unchanged, so mixing never fails.
    pub fn combine_with(&self, other: &Color, table: &ColorMixTable) -> Color {
        table.mix(self, other)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_rgb() {
        let a = Color::new("red", (1, 0, 0));
        let b = Color::new("red", (9, 9, 9));
        assert!(a.is_equal_to(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_case_sensitive() {
        let a = Color::new("red", (255, 0, 0));
        let b = Color::new("Red", (255, 0, 0));
        assert!(!a.is_equal_to(&b));
    }

    #[test]
    fn hash_follows_name() {
        let mut set = HashSet::new();
        set.insert(Color::new("blue", (0, 0, 255)));
        set.insert(Color::new("blue", (1, 2, 3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn combine_uses_registered_rule() {
        let table = ColorMixTable::classic();
        let red = Color::new("red", (255, 0, 0));
        let blue = Color::new("blue", (0, 0, 255));

        let mixed = red.combine_with(&blue, &table);
        assert_eq!(mixed.name(), "purple");
        assert_eq!(mixed.rgb(), (128, 0, 128));
        // Operands are left untouched.
        assert_eq!(red.name(), "red");
        assert_eq!(blue.name(), "blue");
    }

    #[test]
    fn combine_without_rule_keeps_left_operand() {
        let table = ColorMixTable::classic();
        let yellow = Color::new("yellow", (255, 255, 0));
        let red = Color::new("red", (255, 0, 0));

        assert_eq!(yellow.combine_with(&red, &table).name(), "yellow");
        assert_eq!(red.combine_with(&yellow, &table).name(), "red");
    }
}
