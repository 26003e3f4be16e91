use std::fmt;

/// Which half of a predicate carried a rejected character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPart {
    Field,
    Value,
}

impl fmt::Display for TokenPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPart::Field => f.write_str("field"),
            TokenPart::Value => f.write_str("value"),
        }
    }
}

/// Error raised when a predicate cannot be written as a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The field or value contains one of `& | ! =`.
    ReservedCharacter {
        part: TokenPart,
        text: String,
        ch: char,
    },
    /// Predicates must name a field.
    EmptyField,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::ReservedCharacter { part, text, ch } => write!(
                f,
                "{} '{}' contains reserved character '{}'",
                part, text, ch
            ),
            EncodingError::EmptyField => write!(f, "predicate field is empty"),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Error raised when a token or share link cannot be read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    UnknownSigil(char),
    MissingSeparator(String),
    EmptyField(String),
    Share(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty filter token"),
            DecodeError::UnknownSigil(sigil) => write!(f, "unknown filter sigil '{}'", sigil),
            DecodeError::MissingSeparator(token) => {
                write!(f, "filter token '{}' has no '=' separator", token)
            }
            DecodeError::EmptyField(token) => write!(f, "filter token '{}' has no field", token),
            DecodeError::Share(message) => write!(f, "invalid share token: {}", message),
        }
    }
}

impl std::error::Error for DecodeError {}
