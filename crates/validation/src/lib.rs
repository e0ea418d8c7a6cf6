//! `inkpress-validation`: declarative request validation.
//!
//! A route declares an ordered [`RuleSet`]; [`validate`] evaluates every rule
//! against a [`Payload`] and returns one [`FieldError`] per violated rule.
//! Nothing here knows about HTTP frameworks.

pub mod error;
pub mod payload;
pub mod rule;
pub mod validate;

pub use error::FieldError;
pub use payload::{Location, Payload};
pub use rule::{Constraint, Rule, RuleSet};
pub use validate::{sanitize, validate};
