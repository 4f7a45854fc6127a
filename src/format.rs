//! Recursive value formatter
//!
//! Turns a single [`Value`] into styled text, dispatching on shape with a
//! fixed precedence and threading a [`CycleContext`] through every recursive
//! call. No branch returns an error: every fallible conversion degrades to a
//! placeholder token.

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::settings;
use crate::value::{self, ObjectId, Opaque, Represent, Value};

/// Objects currently being rendered within one build call, keyed by identity.
///
/// Allocated fresh per top-level build and shared by mutable reference down
/// the whole call tree. Entries are added only when a builder starts
/// rendering and are never removed for the rest of the build, so a shared
/// object reached through two sibling paths is flagged on the second
/// encounter even when no true back-edge exists.
#[derive(Debug, Default)]
pub struct CycleContext {
    in_progress: HashMap<ObjectId, String>,
}

impl CycleContext {
    /// An empty context for a new top-level build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an object as being rendered, remembering its variable label.
    pub(crate) fn insert(&mut self, id: ObjectId, label: String) {
        self.in_progress.insert(id, label);
    }

    /// Whether the object is already being rendered in this build.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.in_progress.contains_key(&id)
    }

    /// The label stored when the object started rendering, if any.
    #[must_use]
    pub fn label(&self, id: ObjectId) -> Option<&str> {
        self.in_progress.get(&id).map(String::as_str)
    }
}

/// Format a value as styled text.
///
/// `indent` and `line_break` are the units for this nesting level; collapse
/// overrides blank them for a container kind and its descendants. Reads the
/// global settings at every step, so configuration changes between builds are
/// picked up immediately.
pub fn format_value(
    value: &Value,
    ctx: &mut CycleContext,
    indent: &str,
    line_break: &str,
) -> String {
    match value {
        Value::SelfRef => settings::current().palette.boolean.apply("Self"),
        Value::Str(v) => format_str(v),
        Value::Int(v) => settings::current().palette.number.apply(&v.to_string()),
        Value::Float(v) => settings::current().palette.number.apply(&float_text(*v)),
        Value::Bool(v) => settings::current().palette.boolean.apply(&v.to_string()),
        Value::None => settings::current().palette.boolean.apply("None"),
        Value::List(items) => format_list(items, ctx, indent, line_break),
        Value::Tuple(items) => format_tuple(items, ctx, indent, line_break),
        Value::Dict(pairs) => format_dict(pairs, ctx, indent, line_break),
        Value::Class(path) => format_class(path),
        Value::Function { path, wrapped } => format_function(path, *wrapped, line_break),
        Value::EnumMember { path, member } => format_enum(path, member),
        Value::Rendered(rendered) => format_nested(rendered.source(), ctx, indent, line_break),
        Value::Object(obj) => format_object(&**obj, ctx, indent, line_break),
        Value::Opaque(opaque) => format_opaque(opaque),
    }
}

/// Prefix every line containing non-whitespace with `prefix`.
pub(crate) fn indent_lines(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        if line.chars().any(|c| !c.is_whitespace()) {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

/// Best-effort `Display` conversion. A formatter error degrades to the
/// class-styled `Type(!!!)` placeholder instead of propagating.
pub(crate) fn attempt_display(value: &dyn fmt::Display, type_path: &[String]) -> String {
    let mut text = String::new();
    if write!(text, "{value}").is_ok() {
        return text;
    }
    let s = settings::current();
    format!(
        "{}{}{}{}",
        join_class_path(type_path),
        s.palette.bracket.apply("("),
        s.palette.error.apply("!!!"),
        s.palette.bracket.apply(")")
    )
}

/// Dotted qualifier path with every segment class-styled.
fn join_class_path(path: &[String]) -> String {
    let s = settings::current();
    let dot = s.palette.operator.apply(".");
    path.iter()
        .map(|segment| s.palette.class.apply(segment))
        .collect::<Vec<_>>()
        .join(&dot)
}

fn format_str(v: &str) -> String {
    let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
    settings::current()
        .palette
        .string
        .apply(&format!("\"{escaped}\""))
}

/// Text for a float; whole finite values keep a trailing `.0` so they stay
/// distinguishable from integers.
fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

fn collapse<'a>(forced: bool, indent: &'a str, line_break: &'a str) -> (&'a str, &'a str) {
    if forced {
        ("", "")
    } else {
        (indent, line_break)
    }
}

fn format_list(items: &[Value], ctx: &mut CycleContext, indent: &str, line_break: &str) -> String {
    let s = settings::current();
    let (i, lb) = collapse(s.force_lists_collapsed, indent, line_break);
    let comma = s.palette.operator.apply(&s.comma);
    let pieces: Vec<String> = items
        .iter()
        .map(|v| format!("{lb}{}", format_value(v, ctx, i, lb)))
        .collect();
    format!(
        "{}{}{lb}{}",
        s.palette.bracket.apply("["),
        indent_lines(&pieces.join(&comma), i),
        s.palette.bracket.apply("]")
    )
}

fn format_tuple(items: &[Value], ctx: &mut CycleContext, indent: &str, line_break: &str) -> String {
    let s = settings::current();
    let (i, lb) = collapse(s.force_tuples_collapsed, indent, line_break);
    let comma = s.palette.operator.apply(&s.comma);
    let pieces: Vec<String> = items
        .iter()
        .map(|v| format!("{lb}{}", format_value(v, ctx, i, lb)))
        .collect();
    // The trailing comma disambiguates a one-tuple from a parenthesized scalar
    let trailing = if pieces.len() == 1 {
        comma.clone()
    } else {
        String::new()
    };
    format!(
        "{}{}{trailing}{lb}{}",
        s.palette.bracket.apply("("),
        indent_lines(&pieces.join(&comma), i),
        s.palette.bracket.apply(")")
    )
}

fn format_dict(
    pairs: &[(Value, Value)],
    ctx: &mut CycleContext,
    indent: &str,
    line_break: &str,
) -> String {
    let s = settings::current();
    let (i, lb) = collapse(s.force_dicts_collapsed, indent, line_break);
    let comma = s.palette.operator.apply(&s.comma);
    let colon = s.palette.operator.apply(&s.colon);
    let pieces: Vec<String> = pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{lb}{}{colon}{}",
                format_value(k, ctx, i, lb),
                format_value(v, ctx, i, lb)
            )
        })
        .collect();
    format!(
        "{}{}{lb}{}",
        s.palette.bracket.apply("{"),
        indent_lines(&pieces.join(&comma), i),
        s.palette.bracket.apply("}")
    )
}

fn format_class(path: &[String]) -> String {
    join_class_path(path)
}

fn format_function(path: &[String], wrapped: bool, line_break: &str) -> String {
    let s = settings::current();
    let dot = s.palette.operator.apply(".");
    let mut segments: Vec<String> = Vec::with_capacity(path.len());
    for (n, segment) in path.iter().enumerate() {
        if n + 1 == path.len() {
            segments.push(s.palette.function.apply(segment));
        } else {
            segments.push(s.palette.class.apply(segment));
        }
    }
    let mut text = segments.join(&dot);
    if wrapped && line_break.contains('\n') {
        text.push_str(&s.palette.comment.apply(&format!("{}wrapped", s.comment)));
    }
    text
}

fn format_enum(path: &[String], member: &str) -> String {
    let s = settings::current();
    let dot = s.palette.operator.apply(".");
    format!(
        "{}{dot}{}",
        join_class_path(path),
        s.palette.enum_member.apply(member)
    )
}

/// Render a nested builder under the shared cycle context.
///
/// A subject already in the context is a cycle hit and renders as the
/// error-styled label the context stored when that subject started
/// rendering, instead of recursing.
fn format_nested(
    repr: &crate::repr::Repr,
    ctx: &mut CycleContext,
    indent: &str,
    line_break: &str,
) -> String {
    let s = settings::current();
    if let Some(label) = ctx.label(repr.subject_id()) {
        return s.palette.error.apply(label);
    }
    let (i, lb) = collapse(s.force_nested_collapsed, indent, line_break);
    repr.simple_text(ctx, i, lb)
}

fn format_object(
    obj: &dyn Represent,
    ctx: &mut CycleContext,
    indent: &str,
    line_break: &str,
) -> String {
    match obj.repr() {
        Some(repr) => format_nested(&repr, ctx, indent, line_break),
        None => {
            let path = value::type_path(obj.type_label());
            let text = attempt_display(obj, &path);
            settings::current().palette.other.apply(&text)
        }
    }
}

fn format_opaque(opaque: &Opaque) -> String {
    let text = attempt_display(opaque.display(), opaque.type_path());
    settings::current().palette.other.apply(&text)
}
