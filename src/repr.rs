//! Representation builder
//!
//! [`Repr`] accumulates the positional arguments, keyword arguments and
//! post-construction attributes describing one subject object, then renders
//! them on demand. Values are stored raw; rendering is deferred to build time
//! so that one cycle context covers the whole call chain.
//!
//! Any failure while accumulating poisons the builder: further mutating
//! operations become no-ops and every build yields a fixed diagnostic string
//! instead of panicking or returning an error.

use std::fmt;
use std::rc::Rc;

use crate::format::{format_value, indent_lines, CycleContext};
use crate::settings;
use crate::value::{short_type_name, ObjectId, Represent, Value};

/// Accumulator for one object's representation.
#[derive(Debug, Clone)]
pub struct Repr {
    subject_id: ObjectId,
    class_label: String,
    variable_label: String,
    note: String,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
    attrs: Vec<(String, Value)>,
    failure: Option<String>,
}

impl Repr {
    /// Start a representation for `subject`.
    ///
    /// The class label is the last segment of the subject's type label and
    /// the variable label defaults to that name lowercased and wrapped in
    /// double underscores. A type label that yields no class name poisons
    /// the builder instead of failing visibly.
    #[must_use]
    pub fn new(subject: &dyn Represent) -> Self {
        Self::construct(subject, None)
    }

    /// Start a representation with an explicit variable label.
    #[must_use]
    pub fn named(subject: &dyn Represent, variable_name: impl Into<String>) -> Self {
        Self::construct(subject, Some(variable_name.into()))
    }

    fn construct(subject: &dyn Represent, variable_name: Option<String>) -> Self {
        let s = settings::current();
        let class_name = short_type_name(subject.type_label());
        let failure = if class_name.is_empty() {
            Some(format!(
                "cannot derive a class name from type label {:?}",
                subject.type_label()
            ))
        } else {
            None
        };
        let variable =
            variable_name.unwrap_or_else(|| format!("__{}__", class_name.to_lowercase()));
        Self {
            subject_id: subject.identity(),
            class_label: s.palette.class.apply(&class_name),
            variable_label: s.palette.variable.apply(&variable),
            note: String::new(),
            args: Vec::new(),
            kwargs: Vec::new(),
            attrs: Vec::new(),
            failure,
        }
    }

    /// Attach a free-text note, rendered as a comment right after the opening
    /// parenthesis. Suppressed whenever the global line break holds no
    /// newline, so collapsed output stays on one line.
    #[must_use]
    pub fn note(mut self, text: &str) -> Self {
        if self.failure.is_none() {
            let s = settings::current();
            self.note = s.palette.comment.apply(&format!("{}{text}", s.comment));
        }
        self
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        if self.failure.is_none() {
            let value = self.substitute_self(value.into());
            self.args.push(value);
        }
        self
    }

    /// Append several positional arguments.
    #[must_use]
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        if self.failure.is_none() {
            for value in values {
                let value = self.substitute_self(value);
                self.args.push(value);
            }
        }
        self
    }

    /// Store a keyword argument. A later entry with the same name overwrites
    /// in place, keeping the original position.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if self.failure.is_none() {
            let value = self.substitute_self(value.into());
            put(&mut self.kwargs, name.into(), value);
        }
        self
    }

    /// Store a keyword argument unless its value equals `default`, in which
    /// case the pair is omitted from the representation.
    #[must_use]
    pub fn kwarg_or(
        self,
        name: impl Into<String>,
        value: impl Into<Value>,
        default: impl Into<Value>,
    ) -> Self {
        if self.failure.is_some() {
            return self;
        }
        let value = value.into();
        if value == default.into() {
            return self;
        }
        self.kwarg(name, value)
    }

    /// Store several keyword arguments.
    #[must_use]
    pub fn kwargs<N: Into<String>>(mut self, pairs: impl IntoIterator<Item = (N, Value)>) -> Self {
        if self.failure.is_none() {
            for (name, value) in pairs {
                let value = self.substitute_self(value);
                put(&mut self.kwargs, name.into(), value);
            }
        }
        self
    }

    /// Store several keyword arguments, omitting pairs whose value equals
    /// `default`.
    #[must_use]
    pub fn kwargs_or<N: Into<String>>(
        mut self,
        default: impl Into<Value>,
        pairs: impl IntoIterator<Item = (N, Value)>,
    ) -> Self {
        if self.failure.is_none() {
            let default = default.into();
            for (name, value) in pairs {
                if value == default {
                    continue;
                }
                let value = self.substitute_self(value);
                put(&mut self.kwargs, name.into(), value);
            }
        }
        self
    }

    /// Store an attribute, rendered after the call signature. Meant for
    /// state that changes after construction.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if self.failure.is_none() {
            let value = self.substitute_self(value.into());
            put(&mut self.attrs, name.into(), value);
        }
        self
    }

    /// Store an attribute unless its value equals `default`.
    #[must_use]
    pub fn attr_or(
        self,
        name: impl Into<String>,
        value: impl Into<Value>,
        default: impl Into<Value>,
    ) -> Self {
        if self.failure.is_some() {
            return self;
        }
        let value = value.into();
        if value == default.into() {
            return self;
        }
        self.attr(name, value)
    }

    /// Store several attributes.
    #[must_use]
    pub fn attrs<N: Into<String>>(mut self, pairs: impl IntoIterator<Item = (N, Value)>) -> Self {
        if self.failure.is_none() {
            for (name, value) in pairs {
                let value = self.substitute_self(value);
                put(&mut self.attrs, name.into(), value);
            }
        }
        self
    }

    /// Store several attributes, omitting pairs whose value equals `default`.
    #[must_use]
    pub fn attrs_or<N: Into<String>>(
        mut self,
        default: impl Into<Value>,
        pairs: impl IntoIterator<Item = (N, Value)>,
    ) -> Self {
        if self.failure.is_none() {
            let default = default.into();
            for (name, value) in pairs {
                if value == default {
                    continue;
                }
                let value = self.substitute_self(value);
                put(&mut self.attrs, name.into(), value);
            }
        }
        self
    }

    /// Mark this builder as failed.
    ///
    /// Subsequent mutating operations become no-ops and every build yields
    /// the diagnostic form. Representation hooks that run into an error can
    /// return a failed builder to surface the message instead of panicking.
    #[must_use]
    pub fn fail(mut self, description: impl Into<String>) -> Self {
        if self.failure.is_none() {
            self.failure = Some(description.into());
        }
        self
    }

    /// Whether this builder is in the sticky failure state.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.failure.is_some()
    }

    /// Build the full representation: `variableLabel = Simple(...)` followed
    /// by one assignment per attribute, all sharing one cycle context seeded
    /// with this subject. Never fails; a poisoned builder yields the
    /// diagnostic form.
    #[must_use]
    pub fn build(&self) -> Rendered {
        if let Some(description) = &self.failure {
            return Rendered::new(diagnostic_text(description), self.clone());
        }
        let s = settings::current();
        let mut ctx = CycleContext::new();
        let simple = self.simple_text(&mut ctx, &s.indent, &s.line_break);

        let mut text = format!(
            "{}{}{simple}",
            self.variable_label,
            s.palette.operator.apply(&s.equals)
        );
        let separator = format!("{}{}", s.palette.operator.apply(&s.semicolon), s.line_break);
        for (name, value) in &self.attrs {
            let rendered = format_value(value, &mut ctx, &s.indent, &s.line_break);
            text.push_str(&separator);
            text.push_str(&self.variable_label);
            text.push_str(&s.palette.operator.apply("."));
            text.push_str(&s.palette.attribute.apply(name));
            text.push_str(&s.palette.operator.apply(&s.equals));
            text.push_str(&rendered);
        }
        Rendered::new(text, self.clone())
    }

    /// Build only the simple form: `ClassLabel(args, kw=value)` with no
    /// variable label and no attributes.
    #[must_use]
    pub fn build_simple(&self) -> Rendered {
        let s = settings::current();
        let mut ctx = CycleContext::new();
        let text = self.simple_text(&mut ctx, &s.indent, &s.line_break);
        Rendered::new(text, self.clone())
    }

    /// Build the collapsed form `ClassLabel(...)`, ignoring all stored
    /// values.
    #[must_use]
    pub fn build_collapsed(&self) -> Rendered {
        if let Some(description) = &self.failure {
            return Rendered::new(diagnostic_text(description), self.clone());
        }
        let s = settings::current();
        let text = format!(
            "{}{}{}{}",
            self.class_label,
            s.palette.bracket.apply("("),
            s.palette.operator.apply("..."),
            s.palette.bracket.apply(")")
        );
        Rendered::new(text, self.clone())
    }

    /// The simple form under a shared cycle context. Marks the subject as
    /// in progress before rendering any stored value, so recurrences below
    /// this point resolve to the variable label.
    pub(crate) fn simple_text(
        &self,
        ctx: &mut CycleContext,
        indent: &str,
        line_break: &str,
    ) -> String {
        if let Some(description) = &self.failure {
            return diagnostic_text(description);
        }
        ctx.insert(self.subject_id, self.variable_label.clone());

        let s = settings::current();
        let note = if s.line_break.contains('\n') {
            self.note.as_str()
        } else {
            ""
        };
        let body = self.preformat_args(ctx, indent, line_break);
        let open = s.palette.bracket.apply("(");
        let close = s.palette.bracket.apply(")");
        if body.is_empty() {
            format!("{}{open}{note}{close}", self.class_label)
        } else {
            format!("{}{open}{note}{body}{line_break}{close}", self.class_label)
        }
    }

    /// Render positionals then keyword pairs, one per line, indented by one
    /// level. Empty when nothing was stored.
    fn preformat_args(&self, ctx: &mut CycleContext, indent: &str, line_break: &str) -> String {
        let s = settings::current();
        let mut pieces: Vec<String> = Vec::with_capacity(self.args.len() + self.kwargs.len());
        for value in &self.args {
            pieces.push(format!(
                "{line_break}{}",
                format_value(value, ctx, indent, line_break)
            ));
        }
        for (name, value) in &self.kwargs {
            pieces.push(format!(
                "{line_break}{}{}{}",
                s.palette.argument.apply(name),
                s.palette.operator.apply(&s.equals),
                format_value(value, ctx, indent, line_break)
            ));
        }
        if pieces.is_empty() {
            return String::new();
        }
        let comma = s.palette.operator.apply(&s.comma);
        indent_lines(&pieces.join(&comma), indent)
    }

    /// Substitute the self-reference sentinel for values whose identity is
    /// the subject itself.
    fn substitute_self(&self, value: Value) -> Value {
        if value.identity() == Some(self.subject_id) {
            Value::SelfRef
        } else {
            value
        }
    }

    pub(crate) fn subject_id(&self) -> ObjectId {
        self.subject_id
    }
}

fn put(slots: &mut Vec<(String, Value)>, name: String, value: Value) {
    if let Some(slot) = slots.iter_mut().find(|(existing, _)| *existing == name) {
        slot.1 = value;
    } else {
        slots.push((name, value));
    }
}

/// The fixed diagnostic form for a poisoned builder.
fn diagnostic_text(description: &str) -> String {
    let s = settings::current();
    format!(
        "{}{}{}{}",
        s.palette.class.apply("PreprBuildFailure"),
        s.palette.bracket.apply("("),
        s.palette.error.apply(&format!("\"{description}\"")),
        s.palette.bracket.apply(")")
    )
}

/// Rendered text tagged with the builder that produced it.
///
/// Keeping the source builder lets a container holding this handle re-render
/// the simple form under the cycle context of the enclosing build; cached
/// text is only valid for the context it was rendered in.
#[derive(Debug, Clone)]
pub struct Rendered {
    text: String,
    source: Rc<Repr>,
}

impl Rendered {
    fn new(text: String, source: Repr) -> Self {
        Self {
            text,
            source: Rc::new(source),
        }
    }

    /// The rendered text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the handle, keeping only the text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    pub(crate) fn source(&self) -> &Repr {
        &self.source
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Rendered> for String {
    fn from(rendered: Rendered) -> Self {
        rendered.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{with_plain_settings, with_settings};
    use crate::Palette;
    use std::cell::Cell;

    struct Sample {
        a: i64,
    }

    impl fmt::Display for Sample {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Sample({})", self.a)
        }
    }

    impl Represent for Sample {
        fn repr(&self) -> Option<Repr> {
            Some(Repr::new(self).arg(self.a))
        }
    }

    struct Nameless;

    impl fmt::Display for Nameless {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("nameless")
        }
    }

    impl Represent for Nameless {
        fn type_label(&self) -> &'static str {
            ""
        }

        fn repr(&self) -> Option<Repr> {
            Some(Repr::new(self))
        }
    }

    // --- construction ---

    #[test]
    fn test_default_labels_from_type() {
        with_plain_settings(|| {
            let subject = Sample { a: 1 };
            let text = Repr::new(&subject).arg(1).build().into_string();
            assert!(
                text.starts_with("__sample__ = Sample("),
                "Unexpected prefix: {text}"
            );
        });
    }

    #[test]
    fn test_named_variable_label() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 1 };
            let text = Repr::named(&subject, "acct").build().into_string();
            assert_eq!(text, "acct=Sample()");
        });
    }

    #[test]
    fn test_empty_type_label_poisons_but_renders() {
        with_plain_settings(|| {
            let repr = Repr::new(&Nameless);
            assert!(repr.is_poisoned());
            let text = repr.build().into_string();
            assert!(
                text.starts_with("PreprBuildFailure(\""),
                "Expected diagnostic, got: {text}"
            );
            assert!(text.contains("class name"), "Missing description: {text}");
        });
    }

    // --- accumulation ---

    #[test]
    fn test_args_render_in_order() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .arg(1)
                .args([Value::None, Value::from("x")])
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(1,None,\"x\")");
        });
    }

    #[test]
    fn test_kwargs_after_args() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .kwarg("k", 2)
                .arg(1)
                .build_simple()
                .into_string();
            // Positionals always precede keywords, regardless of call order
            assert_eq!(text, "Sample(1,k=2)");
        });
    }

    #[test]
    fn test_kwarg_overwrites_in_place() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .kwarg("a", 1)
                .kwarg("b", 2)
                .kwarg("a", 3)
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(a=3,b=2)");
        });
    }

    #[test]
    fn test_kwarg_or_omits_equal_value() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .kwarg_or("c", "X", "X")
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample()");
        });
    }

    #[test]
    fn test_kwarg_or_keeps_different_value() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .kwarg_or("c", "Y", "X")
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(c=\"Y\")");
        });
    }

    #[test]
    fn test_kwargs_or_filters_per_pair() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .kwargs_or(
                    Value::None,
                    [("a", Value::None), ("b", Value::Int(1)), ("c", Value::None)],
                )
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(b=1)");
        });
    }

    #[test]
    fn test_attrs_or_filters_per_pair() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::named(&subject, "s")
                .attrs_or(Value::None, [("e", Value::None), ("f", Value::Int(9))])
                .build()
                .into_string();
            assert_eq!(text, "s=Sample();s.f=9");
        });
    }

    // --- rendering ---

    #[test]
    fn test_full_form_default_layout() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let text = Repr::named(&subject, "s")
                .arg(1)
                .arg(Value::None)
                .attr("e", 7)
                .build()
                .into_string();
            assert_eq!(text, "s = Sample(\n    1, \n    None\n); \ns.e = 7");
        });
    }

    #[test]
    fn test_simple_form_has_no_variable_or_attrs() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::named(&subject, "s")
                .arg(1)
                .attr("e", 7)
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(1)");
        });
    }

    #[test]
    fn test_collapsed_ignores_values() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .arg(1)
                .kwarg("k", 2)
                .attr("e", 3)
                .build_collapsed()
                .into_string();
            assert_eq!(text, "Sample(...)");
        });
    }

    #[test]
    fn test_note_rendered_in_multiline_mode() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .note("cached")
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample( # cached)");
        });
    }

    #[test]
    fn test_note_suppressed_without_newline() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let repr = Repr::new(&subject).note("cached");
            settings::apply_minimal();
            assert_eq!(repr.build_simple().into_string(), "Sample()");
        });
    }

    #[test]
    fn test_empty_builder_renders_bare_call() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            assert_eq!(Repr::new(&subject).build_simple().into_string(), "Sample()");
        });
    }

    #[test]
    fn test_styled_full_form() {
        with_settings(Palette::RGB8, || {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let text = Repr::named(&subject, "s").arg(1).build().into_string();
            assert_eq!(
                text,
                "\x1b[36ms\x1b[0m\x1b[37m=\x1b[0m\x1b[32mSample\x1b[0m\x1b[33m(\x1b[0m\
                 \x1b[36m1\x1b[0m\x1b[33m)\x1b[0m"
            );
        });
    }

    // --- self references ---

    #[test]
    fn test_direct_self_reference_becomes_sentinel() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let me = Value::object(std::rc::Rc::new(Sample { a: 0 }));
            // An object with the subject's identity is replaced by Self
            let text = Repr::new(&subject)
                .kwarg("me", value_with_identity(&subject))
                .kwarg("other", me)
                .build_simple()
                .into_string();
            assert!(text.contains("me=Self"), "Missing sentinel: {text}");
            assert!(!text.contains("other=Self"), "False positive: {text}");
        });
    }

    /// A Value carrying the same identity as `subject`, built through a
    /// rendered handle's source rather than an `Rc` of the subject itself.
    fn value_with_identity(subject: &Sample) -> Value {
        struct Alias(ObjectId);
        impl fmt::Display for Alias {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("alias")
            }
        }
        impl Represent for Alias {
            fn identity(&self) -> ObjectId {
                self.0
            }
            fn type_label(&self) -> &'static str {
                "Alias"
            }
            fn repr(&self) -> Option<Repr> {
                None
            }
        }
        Value::object(std::rc::Rc::new(Alias(subject.identity())))
    }

    #[test]
    fn test_attr_rendered_handle_of_self_is_cycle_hit() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let first = Repr::named(&subject, "s").arg(1).build();
            let text = Repr::named(&subject, "s")
                .arg(1)
                .attr("again", first)
                .build()
                .into_string();
            assert_eq!(text, "s=Sample(1);s.again=s");
        });
    }

    // --- failure state ---

    #[test]
    fn test_fail_is_sticky_and_mutations_are_noops() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let repr = Repr::new(&subject)
                .fail("boom")
                .arg(1)
                .kwarg("k", 2)
                .attr("e", 3)
                .note("n")
                .fail("later");
            assert!(repr.is_poisoned());
            let text = repr.build().into_string();
            assert_eq!(text, "PreprBuildFailure(\"boom\")");
        });
    }

    #[test]
    fn test_all_build_forms_yield_diagnostic_when_poisoned() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let repr = Repr::new(&subject).fail("boom");
            assert_eq!(repr.build().into_string(), "PreprBuildFailure(\"boom\")");
            assert_eq!(
                repr.build_simple().into_string(),
                "PreprBuildFailure(\"boom\")"
            );
            assert_eq!(
                repr.build_collapsed().into_string(),
                "PreprBuildFailure(\"boom\")"
            );
        });
    }

    // --- rendered handle ---

    #[test]
    fn test_rendered_display_and_conversions() {
        with_plain_settings(|| {
            settings::apply_minimal();
            let subject = Sample { a: 0 };
            let rendered = Repr::new(&subject).arg(1).build_simple();
            assert_eq!(rendered.as_str(), "Sample(1)");
            assert_eq!(rendered.to_string(), "Sample(1)");
            assert_eq!(String::from(rendered.clone()), "Sample(1)");
            assert_eq!(Value::from(rendered.clone()), Value::from("Sample(1)"));
        });
    }

    #[test]
    fn test_settings_read_live_between_builds() {
        with_plain_settings(|| {
            let subject = Sample { a: 0 };
            let repr = Repr::new(&subject).arg(1);
            settings::apply_minimal();
            assert_eq!(repr.build_simple().into_string(), "Sample(1)");
            settings::apply_default();
            assert_eq!(repr.build_simple().into_string(), "Sample(\n    1\n)");
        });
    }

    #[test]
    fn test_hook_counts_one_invocation_per_nested_render() {
        with_plain_settings(|| {
            settings::apply_minimal();
            struct Counting(Cell<u32>);
            impl fmt::Display for Counting {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("counting")
                }
            }
            impl Represent for Counting {
                fn repr(&self) -> Option<Repr> {
                    self.0.set(self.0.get() + 1);
                    Some(Repr::new(self))
                }
            }

            let counted = std::rc::Rc::new(Counting(Cell::new(0)));
            let subject = Sample { a: 0 };
            let text = Repr::new(&subject)
                .arg(Value::object(counted.clone()))
                .build_simple()
                .into_string();
            assert_eq!(text, "Sample(Counting())");
            assert_eq!(counted.0.get(), 1);
        });
    }
}
