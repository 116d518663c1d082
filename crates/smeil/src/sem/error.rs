//! The diagnostic taxonomy produced by semantic analysis.
//!
//! Every variant ties back to one or more source [`Token`]s; a pass fails
//! fast on the first diagnostic it raises rather than accumulating a batch.
//! [`miette::Diagnostic`] is implemented by hand rather than derived: the
//! derive macro wants `SourceSpan` fields, but callers also need the
//! original [`Token`] (its line, column and literal text) to render the
//! plain-text `[line:column] "text": message` form the command line uses.

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;

use crate::token::Token;

#[derive(Debug, Error)]
pub enum SemError {
    #[error("unrecognized type `{name}`")]
    BadType { name: String, at: Token },

    #[error("circular type definition involving `{name}`")]
    CircularType { name: String, at: Token },

    #[error("`{name}` is already defined in this scope")]
    DuplicateSymbol { name: String, at: Token, first: Token },

    #[error("unknown name `{name}`")]
    UnknownSymbol { name: String, at: Token, suggestion: Option<String> },

    #[error("`{name}` is a reserved keyword or intrinsic type name")]
    ReservedName { name: String, at: Token },

    #[error("named argument `{name}` does not match any formal parameter")]
    UnknownParameter { name: String, at: Token },

    #[error("formal parameter `{name}` bound more than once")]
    DuplicateArgument { name: String, at: Token, first: Token },

    #[error("positional argument follows a named argument")]
    PositionalAfterNamed { at: Token },

    #[error("formal parameter `{name}` was never bound")]
    MissingArgument { name: String, at: Token },

    #[error("value-typed formal parameter `{name}` cannot be declared `out`")]
    OutValueParameter { name: String, at: Token },

    #[error("argument type does not match formal parameter `{name}`")]
    ArgumentTypeMismatch { name: String, at: Token, precision_loss: bool },

    #[error("assignment loses precision: source is wider than target")]
    PrecisionLoss { at: Token },

    #[error("{message}")]
    TypeMismatch { message: String, at: Token },

    #[error("cannot cast between these types")]
    IncompatibleCast { at: Token },

    #[error("illegal {direction} of signal `{name}`")]
    IllegalSignalDirection { name: String, direction: &'static str, at: Token },

    #[error("constant `{name}` refers to itself")]
    SelfReferenceInitializer { name: String, at: Token },

    #[error("circular constant initializer involving `{name}`")]
    CircularInitializer { name: String, at: Token },

    #[error("constant initializer for `{name}` does not resolve to a literal, enum field, or constant")]
    NonConstantInitializer { name: String, at: Token },

    #[error("signal `{name}` is written by more than one process")]
    MultipleWriters { name: String, at: Token, writers: Vec<Token> },

    #[error("input signal `{name}` has no writer")]
    OrphanSignal { name: String, at: Token },

    #[error("dependency schedule cannot progress: a cycle involves `{name}`")]
    CircularDependency { name: String, at: Token },

    #[error("`connect` endpoints are not compatible")]
    IncompatibleConnect { at: Token },

    #[error("instance recursion limit exceeded while elaborating `{name}`")]
    RecursionLimitExceeded { name: String, at: Token },

    #[error("expression in argument position is not a name or literal")]
    UnsupportedArgumentExpr { at: Token },
}

impl SemError {
    /// Every token this diagnostic cites, primary location first.
    pub fn tokens(&self) -> Vec<&Token> {
        use SemError::*;
        match self {
            BadType { at, .. }
            | CircularType { at, .. }
            | UnknownSymbol { at, .. }
            | ReservedName { at, .. }
            | UnknownParameter { at, .. }
            | PositionalAfterNamed { at }
            | MissingArgument { at, .. }
            | OutValueParameter { at, .. }
            | ArgumentTypeMismatch { at, .. }
            | PrecisionLoss { at }
            | TypeMismatch { at, .. }
            | IncompatibleCast { at }
            | IllegalSignalDirection { at, .. }
            | SelfReferenceInitializer { at, .. }
            | CircularInitializer { at, .. }
            | NonConstantInitializer { at, .. }
            | OrphanSignal { at, .. }
            | CircularDependency { at, .. }
            | IncompatibleConnect { at }
            | RecursionLimitExceeded { at, .. }
            | UnsupportedArgumentExpr { at } => vec![at],
            DuplicateSymbol { at, first, .. } | DuplicateArgument { at, first, .. } => vec![at, first],
            MultipleWriters { at, writers, .. } => {
                let mut out = vec![at];
                out.extend(writers.iter());
                out
            }
        }
    }

    fn code_str(&self) -> &'static str {
        use SemError::*;
        match self {
            BadType { .. } => "smeil::bad_type",
            CircularType { .. } => "smeil::circular_type",
            DuplicateSymbol { .. } => "smeil::duplicate_symbol",
            UnknownSymbol { .. } => "smeil::unknown_symbol",
            ReservedName { .. } => "smeil::reserved_name",
            UnknownParameter { .. } => "smeil::unknown_parameter",
            DuplicateArgument { .. } => "smeil::duplicate_argument",
            PositionalAfterNamed { .. } => "smeil::positional_after_named",
            MissingArgument { .. } => "smeil::missing_argument",
            OutValueParameter { .. } => "smeil::out_value_parameter",
            ArgumentTypeMismatch { .. } => "smeil::argument_type_mismatch",
            PrecisionLoss { .. } => "smeil::precision_loss",
            TypeMismatch { .. } => "smeil::type_mismatch",
            IncompatibleCast { .. } => "smeil::incompatible_cast",
            IllegalSignalDirection { .. } => "smeil::illegal_signal_direction",
            SelfReferenceInitializer { .. } => "smeil::self_reference_initializer",
            CircularInitializer { .. } => "smeil::circular_initializer",
            NonConstantInitializer { .. } => "smeil::non_constant_initializer",
            MultipleWriters { .. } => "smeil::multiple_writers",
            OrphanSignal { .. } => "smeil::orphan_signal",
            CircularDependency { .. } => "smeil::circular_dependency",
            IncompatibleConnect { .. } => "smeil::incompatible_connect",
            RecursionLimitExceeded { .. } => "smeil::recursion_limit",
            UnsupportedArgumentExpr { .. } => "smeil::unsupported_argument_expr",
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            SemError::DuplicateSymbol { .. } => Some("rename one of the two declarations".to_string()),
            SemError::RecursionLimitExceeded { .. } => {
                Some("check for a network or process that instantiates itself".to_string())
            }
            SemError::UnknownSymbol { suggestion, .. } => {
                suggestion.as_ref().map(|s| format!("did you mean `{s}`?"))
            }
            _ => None,
        }
    }

    pub fn duplicate_symbol(name: impl Into<String>, at: Token, first: Token) -> Self {
        SemError::DuplicateSymbol { name: name.into(), at, first }
    }

    pub fn bad_type(name: impl Into<String>, at: &Token) -> Self {
        SemError::BadType { name: name.into(), at: at.clone() }
    }

    pub fn circular_type(name: impl Into<String>, at: &Token) -> Self {
        SemError::CircularType { name: name.into(), at: at.clone() }
    }

    pub fn unknown_symbol(name: impl Into<String>, at: &Token, suggestion: Option<String>) -> Self {
        SemError::UnknownSymbol { name: name.into(), at: at.clone(), suggestion }
    }

    pub fn reserved_name(name: impl Into<String>, at: &Token) -> Self {
        SemError::ReservedName { name: name.into(), at: at.clone() }
    }
}

impl Diagnostic for SemError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help_text().map(|text| Box::new(text) as Box<dyn std::fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let spans: Vec<_> = self.tokens().into_iter().map(|t| LabeledSpan::underline(t.span())).collect();
        if spans.is_empty() {
            None
        } else {
            Some(Box::new(spans.into_iter()))
        }
    }
}
