//! Palette configuration: the named colors a game uses, the single-character
//! codes levels refer to them by, and the mixing rules between them.
//!
//! Palettes are written in TOML:
//!
//! ```toml
//! [[colors]]
//! name = "red"
//! code = "R"
//! rgb = [255, 0, 0]
//!
//! [[mixes]]
//! first = "red"
//! second = "blue"
//! result = "purple"
//! ```

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::{
    color::Color,
    mix::{ColorMixTable, MixError},
};

/// Represents errors raised while loading a palette.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read palette file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed palette: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Color '{0}' is declared more than once")]
    DuplicateColor(String),
    #[error("Color code '{code}' is used by both '{first}' and '{second}'")]
    DuplicateCode {
        code: char,
        first: String,
        second: String,
    },
    #[error("Mix rule refers to undeclared color '{0}'")]
    UnknownColor(String),
    #[error(transparent)]
    Mix(#[from] MixError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteFile {
    #[serde(default)]
    colors: Vec<ColorEntry>,
    #[serde(default)]
    mixes: Vec<MixEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColorEntry {
    name: String,
    code: char,
    rgb: (u8, u8, u8),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MixEntry {
    first: String,
    second: String,
    result: String,
}

/// The set of colors available to a game together with its mix table.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
    codes: HashMap<char, usize>,
    mix_table: ColorMixTable,
}

impl Palette {
    /// The palette the game ships with.
    pub fn classic() -> Self {
        let colors = [
            ("red", 'R', (255, 0, 0)),
            ("green", 'G', (0, 255, 0)),
            ("blue", 'B', (0, 0, 255)),
            ("yellow", 'Y', (255, 255, 0)),
            ("purple", 'P', (128, 0, 128)),
            ("brown", 'N', (139, 69, 19)),
        ];
        let mut codes = HashMap::new();
        let colors = colors
            .into_iter()
            .enumerate()
            .map(|(index, (name, code, rgb))| {
                codes.insert(code, index);
                Color::new(name, rgb)
            })
            .collect();
        Palette {
            colors,
            codes,
            mix_table: ColorMixTable::classic(),
        }
    }

    /// Reads a palette from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses a palette from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: PaletteFile = toml::from_str(text)?;

        let mut colors: Vec<Color> = Vec::with_capacity(file.colors.len());
        let mut codes = HashMap::new();
        for entry in file.colors {
            if colors.iter().any(|c| c.name() == entry.name) {
                return Err(ConfigError::DuplicateColor(entry.name));
            }
            if let Some(&other) = codes.get(&entry.code) {
                let first: &Color = &colors[other];
                return Err(ConfigError::DuplicateCode {
                    code: entry.code,
                    first: first.name().to_string(),
                    second: entry.name,
                });
            }
            codes.insert(entry.code, colors.len());
            colors.push(Color::new(entry.name, entry.rgb));
        }

        let mut palette = Palette {
            colors,
            codes,
            mix_table: ColorMixTable::new(),
        };
        for mix in file.mixes {
            for name in [&mix.first, &mix.second] {
                if palette.color(name).is_none() {
                    return Err(ConfigError::UnknownColor(name.clone()));
                }
            }
            let result = palette
                .color(&mix.result)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownColor(mix.result.clone()))?;
            palette
                .mix_table
                .register(&mix.first, &mix.second, result)?;
        }
        Ok(palette)
    }

    /// Looks up a declared color by name.
    pub fn color(&self, name: &str) -> Option<&Color> {
        self.colors.iter().find(|c| c.name() == name)
    }

    /// Looks up a declared color by its level code.
    pub fn by_code(&self, code: char) -> Option<&Color> {
        self.codes.get(&code).map(|&index| &self.colors[index])
    }

    /// Returns the level code assigned to `color`, if it is part of this palette.
    pub fn code_of(&self, color: &Color) -> Option<char> {
        self.codes
            .iter()
            .find(|&(_, &index)| self.colors[index].is_equal_to(color))
            .map(|(&code, _)| code)
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn mix_table(&self) -> &ColorMixTable {
        &self.mix_table
    }

    pub fn into_mix_table(self) -> ColorMixTable {
        self.mix_table
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        [[colors]]
        name = "red"
        code = "R"
        rgb = [255, 0, 0]

        [[colors]]
        name = "blue"
        code = "B"
        rgb = [0, 0, 255]

        [[colors]]
        name = "purple"
        code = "P"
        rgb = [128, 0, 128]

        [[mixes]]
        first = "red"
        second = "blue"
        result = "purple"
    "#;

    #[test]
    fn parses_colors_codes_and_mixes() {
        let palette = Palette::from_toml_str(SMALL).unwrap();
        assert_eq!(palette.colors().len(), 3);
        assert_eq!(palette.by_code('B').map(Color::name), Some("blue"));
        assert_eq!(palette.color("purple").map(Color::rgb), Some((128, 0, 128)));
        assert_eq!(palette.code_of(&Color::new("red", (0, 0, 0))), Some('R'));

        let table = palette.mix_table();
        assert_eq!(table.lookup("blue", "red").map(Color::name), Some("purple"));
    }

    #[test]
    fn empty_document_is_an_empty_palette() {
        let palette = Palette::from_toml_str("").unwrap();
        assert!(palette.colors().is_empty());
        assert!(palette.mix_table().is_empty());
    }

    #[test]
    fn mix_with_undeclared_color_is_rejected() {
        let text = format!("{SMALL}\n[[mixes]]\nfirst = \"red\"\nsecond = \"teal\"\nresult = \"blue\"\n");
        let err = Palette::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownColor(name) if name == "teal"));
    }

    #[test]
    fn conflicting_mix_is_rejected() {
        let text = format!("{SMALL}\n[[mixes]]\nfirst = \"blue\"\nsecond = \"red\"\nresult = \"red\"\n");
        let err = Palette::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Mix(MixError::ConflictingRule { .. })));
    }

    #[test]
    fn duplicate_names_and_codes_are_rejected() {
        let dup_name = "[[colors]]\nname = \"red\"\ncode = \"R\"\nrgb = [1, 0, 0]\n\
                        [[colors]]\nname = \"red\"\ncode = \"S\"\nrgb = [2, 0, 0]\n";
        assert!(matches!(
            Palette::from_toml_str(dup_name),
            Err(ConfigError::DuplicateColor(name)) if name == "red"
        ));

        let dup_code = "[[colors]]\nname = \"red\"\ncode = \"R\"\nrgb = [1, 0, 0]\n\
                        [[colors]]\nname = \"rose\"\ncode = \"R\"\nrgb = [2, 0, 0]\n";
        assert!(matches!(
            Palette::from_toml_str(dup_code),
            Err(ConfigError::DuplicateCode { code: 'R', .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Palette::from_toml_str("[[colors]]\nname = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn classic_palette_covers_every_mix_result() {
        let palette = Palette::classic();
        for (first, second, result) in palette.mix_table().rules() {
            assert!(palette.color(first).is_some());
            assert!(palette.color(second).is_some());
            assert!(palette.color(result.name()).is_some());
        }
        assert_eq!(palette.by_code('N').map(Color::name), Some("brown"));
    }
}
