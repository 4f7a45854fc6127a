//! Global formatting settings
//!
//! Process-wide state read by every build call. The lock only guards against
//! data races; mutating settings while a render is in progress on another
//! thread is not synchronized and yields mixed output. Mutate between builds.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::style::Palette;

/// Layout and styling state applied to every build call.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Indentation unit added per nesting level.
    pub indent: String,
    /// Line break inserted before elements and closing brackets.
    pub line_break: String,
    /// Separator between elements and argument pairs.
    pub comma: String,
    /// Separator between mapping keys and values.
    pub colon: String,
    /// Separator between the call signature and attribute assignments.
    pub semicolon: String,
    /// Separator between names and values in assignments.
    pub equals: String,
    /// Marker prefixed to notes and the wrapped-function comment.
    pub comment: String,
    /// Force every list onto one line.
    pub force_lists_collapsed: bool,
    /// Force every tuple onto one line.
    pub force_tuples_collapsed: bool,
    /// Force every dict onto one line.
    pub force_dicts_collapsed: bool,
    /// Force every nested representation onto one line.
    pub force_nested_collapsed: bool,
    /// The active style table.
    pub palette: Palette,
}

impl Settings {
    /// The spaced default profile with the full-RGB palette.
    #[must_use]
    pub fn default_profile() -> Self {
        Self {
            indent: "    ".to_string(),
            line_break: "\n".to_string(),
            comma: ", ".to_string(),
            colon: ": ".to_string(),
            semicolon: "; ".to_string(),
            equals: " = ".to_string(),
            comment: " # ".to_string(),
            force_lists_collapsed: false,
            force_tuples_collapsed: false,
            force_dicts_collapsed: false,
            force_nested_collapsed: false,
            palette: Palette::RGBFULL,
        }
    }

    /// The minimal profile: whitespace stripped, every collapse flag forced.
    /// Keeps the given palette.
    #[must_use]
    pub fn minimal_profile(palette: Palette) -> Self {
        Self {
            indent: String::new(),
            line_break: String::new(),
            comma: ",".to_string(),
            colon: ":".to_string(),
            semicolon: ";".to_string(),
            equals: "=".to_string(),
            comment: "#".to_string(),
            force_lists_collapsed: true,
            force_tuples_collapsed: true,
            force_dicts_collapsed: true,
            force_nested_collapsed: true,
            palette,
        }
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default_profile()));

/// Snapshot of the current settings.
///
/// Formatting helpers call this at every use site, so mutations between
/// builds are immediately visible to the next build.
#[must_use]
pub fn current() -> Settings {
    SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn replace_layout(next: Settings) {
    let mut guard = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
    *guard = next;
}

/// Replace the layout state with the spaced default profile.
///
/// The active palette is left in place; use [`set_palette`] to change it.
pub fn apply_default() {
    let palette = current().palette;
    let mut next = Settings::default_profile();
    next.palette = palette;
    replace_layout(next);
}

/// Replace the layout state with the minimal profile: separators unspaced,
/// indentation and line breaks removed, every collapse flag forced.
///
/// The active palette is left in place; use [`set_palette`] to change it.
pub fn apply_minimal() {
    let palette = current().palette;
    replace_layout(Settings::minimal_profile(palette));
}

/// Install a new style table.
pub fn set_palette(palette: Palette) {
    let mut guard = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
    guard.palette = palette;
}

/// A partial settings override; `None` fields keep their current value.
///
/// This is also the on-disk profile format: a TOML document whose keys match
/// the field names, with `palette` naming a built-in table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    /// Indentation unit.
    pub indent: Option<String>,
    /// Line break string.
    pub line_break: Option<String>,
    /// Element separator.
    pub comma: Option<String>,
    /// Key/value separator.
    pub colon: Option<String>,
    /// Signature/attribute separator.
    pub semicolon: Option<String>,
    /// Assignment separator.
    pub equals: Option<String>,
    /// Comment marker.
    pub comment: Option<String>,
    /// Force lists onto one line.
    pub force_lists_collapsed: Option<bool>,
    /// Force tuples onto one line.
    pub force_tuples_collapsed: Option<bool>,
    /// Force dicts onto one line.
    pub force_dicts_collapsed: Option<bool>,
    /// Force nested representations onto one line.
    pub force_nested_collapsed: Option<bool>,
    /// Built-in palette name: `rgbfull`, `rgb256`, `rgb8` or `none`.
    pub palette: Option<String>,
}

/// Apply a partial override on top of the current settings.
///
/// Fails without changing anything when the palette name is unknown.
pub fn update(patch: &SettingsUpdate) -> Result<()> {
    let palette = match &patch.palette {
        Some(name) => match Palette::by_name(name) {
            Some(palette) => Some(palette),
            None => bail!(
                "Unknown palette '{name}'. Available palettes: {}",
                Palette::known_names()
            ),
        },
        None => None,
    };

    let mut guard = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(v) = &patch.indent {
        guard.indent.clone_from(v);
    }
    if let Some(v) = &patch.line_break {
        guard.line_break.clone_from(v);
    }
    if let Some(v) = &patch.comma {
        guard.comma.clone_from(v);
    }
    if let Some(v) = &patch.colon {
        guard.colon.clone_from(v);
    }
    if let Some(v) = &patch.semicolon {
        guard.semicolon.clone_from(v);
    }
    if let Some(v) = &patch.equals {
        guard.equals.clone_from(v);
    }
    if let Some(v) = &patch.comment {
        guard.comment.clone_from(v);
    }
    if let Some(v) = patch.force_lists_collapsed {
        guard.force_lists_collapsed = v;
    }
    if let Some(v) = patch.force_tuples_collapsed {
        guard.force_tuples_collapsed = v;
    }
    if let Some(v) = patch.force_dicts_collapsed {
        guard.force_dicts_collapsed = v;
    }
    if let Some(v) = patch.force_nested_collapsed {
        guard.force_nested_collapsed = v;
    }
    if let Some(v) = palette {
        guard.palette = v;
    }
    Ok(())
}

/// Parse a TOML settings profile and apply it over the current settings.
pub fn load_from_str(content: &str) -> Result<()> {
    let patch: SettingsUpdate =
        toml::from_str(content).context("Failed to parse settings profile")?;
    update(&patch)
}

/// Load a TOML settings profile from a file and apply it.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings profile: {}", path.display()))?;
    load_from_str(&content)
}
