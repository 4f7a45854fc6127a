//! Style tables for colorized output
//!
//! A [`Palette`] maps semantic token kinds to terminal styles. Every style is
//! a prefix/suffix pair wrapped around a text fragment, so substituting
//! [`Palette::NONE`] degrades output to plain text without changing structure.

use std::borrow::Cow;

/// ANSI reset sequence appended after every colored fragment.
const RESET: &str = "\x1b[0m";

/// A single text decoration: a prefix and suffix wrapped around a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    prefix: Cow<'static, str>,
    suffix: Cow<'static, str>,
}

impl Style {
    /// A style that starts with the given ANSI sequence and ends with a reset.
    #[must_use]
    pub const fn ansi(prefix: &'static str) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            suffix: Cow::Borrowed(RESET),
        }
    }

    /// A style that applies no decoration at all.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            prefix: Cow::Borrowed(""),
            suffix: Cow::Borrowed(""),
        }
    }

    /// A custom style with arbitrary prefix and suffix.
    pub fn new(prefix: impl Into<Cow<'static, str>>, suffix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Wrap `text` with this style's prefix and suffix.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}{}", self.prefix, text, self.suffix)
    }
}

/// A complete style table: one [`Style`] per semantic token kind.
///
/// All fifteen kinds must be supplied; the built-in tables carry the ANSI
/// sequences used by the reference color schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Function names (final segment of a callable path).
    pub function: Style,
    /// Class names and qualifier path segments.
    pub class: Style,
    /// Quoted string values.
    pub string: Style,
    /// Integer and float values.
    pub number: Style,
    /// Fallback values with no structured representation.
    pub other: Style,
    /// Variable labels on the left of assignments.
    pub variable: Style,
    /// Attribute names after the variable label.
    pub attribute: Style,
    /// Keyword argument names.
    pub argument: Style,
    /// Separators: dots, commas, colons, equals.
    pub operator: Style,
    /// Comment fragments such as notes and the wrapped marker.
    pub comment: Style,
    /// Brackets, parentheses and braces.
    pub bracket: Style,
    /// Error tokens: cycle hits, conversion placeholders, diagnostics.
    pub error: Style,
    /// Booleans, `None` and the `Self` sentinel.
    pub boolean: Style,
    /// Enumeration member names (final segment).
    pub enum_member: Style,
    /// The reset style, for callers that need an explicit reset wrapper.
    pub reset: Style,
}

impl Palette {
    /// Full 24-bit RGB table. The most accurate of the built-in tables.
    pub const RGBFULL: Self = Self {
        function: Style::ansi("\x1b[38;2;219;219;170m"),
        class: Style::ansi("\x1b[38;2;77;200;176m"),
        string: Style::ansi("\x1b[38;2;205;144;120m"),
        number: Style::ansi("\x1b[38;2;180;205;168m"),
        other: Style::ansi("\x1b[38;2;211;211;211m"),
        variable: Style::ansi("\x1b[38;2;156;219;253m"),
        attribute: Style::ansi("\x1b[38;2;156;219;253m"),
        argument: Style::ansi("\x1b[38;2;156;219;253m"),
        operator: Style::ansi("\x1b[38;2;211;211;211m"),
        comment: Style::ansi("\x1b[38;2;109;109;109m"),
        bracket: Style::ansi("\x1b[38;2;254;214;24m"),
        error: Style::ansi("\x1b[38;2;243;71;70m"),
        boolean: Style::ansi("\x1b[38;2;86;156;213m"),
        enum_member: Style::ansi("\x1b[38;2;80;193;253m"),
        reset: Style::ansi("\x1b[0m"),
    };

    /// 256-color table. Less accurate than [`Palette::RGBFULL`] but works in
    /// more terminals.
    pub const RGB256: Self = Self {
        function: Style::ansi("\x1b[38;5;179m"),
        class: Style::ansi("\x1b[38;5;43m"),
        string: Style::ansi("\x1b[38;5;180m"),
        number: Style::ansi("\x1b[38;5;151m"),
        other: Style::ansi("\x1b[38;5;251m"),
        variable: Style::ansi("\x1b[38;5;153m"),
        attribute: Style::ansi("\x1b[38;5;153m"),
        argument: Style::ansi("\x1b[38;5;153m"),
        operator: Style::ansi("\x1b[38;5;251m"),
        comment: Style::ansi("\x1b[38;5;241m"),
        bracket: Style::ansi("\x1b[38;5;221m"),
        error: Style::ansi("\x1b[38;5;203m"),
        boolean: Style::ansi("\x1b[38;5;26m"),
        enum_member: Style::ansi("\x1b[38;5;26m"),
        reset: Style::ansi("\x1b[0m"),
    };

    /// 8-color table. The least accurate but most compatible.
    pub const RGB8: Self = Self {
        function: Style::ansi("\x1b[33m"),
        class: Style::ansi("\x1b[32m"),
        string: Style::ansi("\x1b[31m"),
        number: Style::ansi("\x1b[36m"),
        other: Style::ansi("\x1b[37m"),
        variable: Style::ansi("\x1b[36m"),
        attribute: Style::ansi("\x1b[36m"),
        argument: Style::ansi("\x1b[36m"),
        operator: Style::ansi("\x1b[37m"),
        comment: Style::ansi("\x1b[30m"),
        bracket: Style::ansi("\x1b[33m"),
        error: Style::ansi("\x1b[31m"),
        boolean: Style::ansi("\x1b[34m"),
        enum_member: Style::ansi("\x1b[34m"),
        reset: Style::ansi("\x1b[0m"),
    };

    /// A table that applies no terminal formatting.
    pub const NONE: Self = Self {
        function: Style::plain(),
        class: Style::plain(),
        string: Style::plain(),
        number: Style::plain(),
        other: Style::plain(),
        variable: Style::plain(),
        attribute: Style::plain(),
        argument: Style::plain(),
        operator: Style::plain(),
        comment: Style::plain(),
        bracket: Style::plain(),
        error: Style::plain(),
        boolean: Style::plain(),
        enum_member: Style::plain(),
        reset: Style::plain(),
    };

    /// Look up a built-in table by name.
    ///
    /// Known names are `"rgbfull"`, `"rgb256"`, `"rgb8"` and `"none"`.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "rgbfull" => Some(Self::RGBFULL),
            "rgb256" => Some(Self::RGB256),
            "rgb8" => Some(Self::RGB8),
            "none" => Some(Self::NONE),
            _ => None,
        }
    }

    /// Names accepted by [`Palette::by_name`], for error messages.
    #[must_use]
    pub const fn known_names() -> &'static str {
        "rgbfull, rgb256, rgb8, none"
    }
}
