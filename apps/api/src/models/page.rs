//! Page model — the typed form of a `comic_page` markup document.
//!
//! Field names follow the markup document (snake_case, except `writing-mode`).
//! Every string field is optional: a missing, null, or empty value falls back
//! to the documented default when read through the accessor methods.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_LANGUAGE: &str = "Japanese";
pub const DEFAULT_STYLE: &str = "japanese manga";
pub const DEFAULT_COLOR_MODE: &str = "カラー";
pub const DEFAULT_ASPECT_RATIO: &str = "1:1.4";
pub const DEFAULT_WRITING_MODE: &str = "vertical-rl";
pub const DEFAULT_PAGE_POSITION: &str = "middle";
pub const DEFAULT_PANEL_POSITION: &str = "center";
pub const DEFAULT_CAMERA_ANGLE: &str = "medium shot";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One full comic page: style settings, recurring characters, and panels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color_mode: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default, rename = "writing-mode", alias = "writing_mode")]
    pub writing_mode: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub layout_constraints: Option<String>,
    #[serde(default, rename = "character_infos", deserialize_with = "null_as_default")]
    pub characters: Vec<CharacterIdentity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
}

/// Fixed visual identity of a recurring character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterIdentity {
    pub name: String,
    #[serde(default)]
    pub base_prompt: Option<String>,
}

/// One frame of the page. Reading order is the sequence order, not `number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Panel {
    #[serde(deserialize_with = "integer_or_numeric_text")]
    pub number: i64,
    #[serde(default)]
    pub page_position: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub camera_angle: Option<String>,
    /// Kept structurally; not rendered into the prompt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub effects: Vec<serde_yaml::Value>,
    /// Kept structurally; not rendered into the prompt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub monologues: Vec<serde_yaml::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub characters: Vec<PanelCharacter>,
}

/// A character's appearance inside a single panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelCharacter {
    pub name: String,
    #[serde(default)]
    pub panel_position: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub facing: Option<String>,
    #[serde(default)]
    pub shot: Option<String>,
    #[serde(default)]
    pub pose: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<DialogueLine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueLine {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub char_text_position: Option<String>,
    #[serde(default, rename = "type")]
    pub line_type: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Defaulted accessors
// ────────────────────────────────────────────────────────────────────────────

/// Returns the value unless it is missing or empty, else `fallback`.
fn text_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

impl PageSpec {
    pub fn language(&self) -> &str {
        text_or(&self.language, DEFAULT_LANGUAGE)
    }

    pub fn style(&self) -> &str {
        text_or(&self.style, DEFAULT_STYLE)
    }

    pub fn color_mode(&self) -> &str {
        text_or(&self.color_mode, DEFAULT_COLOR_MODE)
    }

    pub fn aspect_ratio(&self) -> &str {
        text_or(&self.aspect_ratio, DEFAULT_ASPECT_RATIO)
    }

    pub fn writing_mode(&self) -> &str {
        text_or(&self.writing_mode, DEFAULT_WRITING_MODE)
    }

    pub fn instructions(&self) -> &str {
        text_or(&self.instructions, "")
    }

    pub fn layout_constraints(&self) -> &str {
        text_or(&self.layout_constraints, "")
    }

    /// Panel character names that have no matching `character_infos` entry.
    /// Each name is reported once, in first-appearance order.
    pub fn unmatched_panel_characters(&self) -> Vec<String> {
        let mut unmatched: Vec<String> = Vec::new();
        for panel in &self.panels {
            for character in &panel.characters {
                let known = self.characters.iter().any(|c| c.name == character.name);
                if !known && !unmatched.contains(&character.name) {
                    unmatched.push(character.name.clone());
                }
            }
        }
        unmatched
    }
}

impl CharacterIdentity {
    pub fn base_prompt(&self) -> &str {
        text_or(&self.base_prompt, "")
    }
}

impl Panel {
    pub fn page_position(&self) -> &str {
        text_or(&self.page_position, DEFAULT_PAGE_POSITION)
    }

    pub fn background(&self) -> &str {
        text_or(&self.background, "")
    }

    pub fn description(&self) -> &str {
        text_or(&self.description, "")
    }

    pub fn camera_angle(&self) -> &str {
        text_or(&self.camera_angle, DEFAULT_CAMERA_ANGLE)
    }
}

impl PanelCharacter {
    pub fn panel_position(&self) -> &str {
        text_or(&self.panel_position, DEFAULT_PANEL_POSITION)
    }

    pub fn emotion(&self) -> &str {
        text_or(&self.emotion, "")
    }

    pub fn facing(&self) -> &str {
        text_or(&self.facing, "")
    }

    pub fn shot(&self) -> &str {
        text_or(&self.shot, "")
    }

    pub fn pose(&self) -> &str {
        text_or(&self.pose, "")
    }

    /// Text of the first dialogue line. Later lines are never surfaced.
    pub fn first_line(&self) -> &str {
        self.lines.first().map(|l| l.text.as_str()).unwrap_or("")
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `1` as well as a quoted `"1"`.
fn integer_or_numeric_text<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Integer(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("panel number must be an integer, got {text:?}"))
        }),
    }
}
