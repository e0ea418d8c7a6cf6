use std::borrow::Cow;

use crate::Location;

const DEFAULT_MESSAGE: &str = "Invalid value";

/// What a rule checks once the field is known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Non-empty after trimming.
    Present,
    /// Character count within bounds (inclusive).
    Length { min: Option<usize>, max: Option<usize> },
    /// `local@domain.tld` shape.
    Email,
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
    /// Integer (JSON number or decimal string) within bounds (inclusive).
    IntRange { min: Option<i64>, max: Option<i64> },
    /// JSON boolean, or one of `"true"`, `"false"`, `"1"`, `"0"`.
    Boolean,
    /// Record identifier (UUID).
    Identifier,
}

/// A single field constraint with its client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub field: Cow<'static, str>,
    pub location: Location,
    pub constraint: Constraint,
    pub message: Cow<'static, str>,
    /// Skip the rule entirely when the field is absent or null.
    pub optional: bool,
    /// Check the trimmed string (and store it trimmed on sanitize).
    pub trim: bool,
    /// Lower-case the stored value on sanitize.
    pub normalize_email: bool,
}

impl Rule {
    pub fn new(location: Location, field: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            location,
            constraint: Constraint::Present,
            message: Cow::Borrowed(DEFAULT_MESSAGE),
            optional: false,
            trim: false,
            normalize_email: false,
        }
    }

    pub fn body(field: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Location::Body, field)
    }

    pub fn param(field: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Location::Params, field)
    }

    pub fn query(field: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Location::Query, field)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn normalize_email(mut self) -> Self {
        self.normalize_email = true;
        self
    }

    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn present(self) -> Self {
        self.constraint(Constraint::Present)
    }

    pub fn length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraint(Constraint::Length { min, max })
    }

    pub fn email(self) -> Self {
        self.constraint(Constraint::Email)
    }

    pub fn one_of(self, allowed: &'static [&'static str]) -> Self {
        self.constraint(Constraint::OneOf(allowed))
    }

    pub fn int_range(self, min: Option<i64>, max: Option<i64>) -> Self {
        self.constraint(Constraint::IntRange { min, max })
    }

    pub fn boolean(self) -> Self {
        self.constraint(Constraint::Boolean)
    }

    pub fn identifier(self) -> Self {
        self.constraint(Constraint::Identifier)
    }

    fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Ordered rules for one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Append `other`'s rules after this set's rules.
    pub fn and(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter)
    }
}
