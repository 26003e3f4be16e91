//! Compact string form of predicates.
//!
//! A token is a kind sigil followed by `field=value`:
//!
//! ```text
//! &series=ST01      AND
//! |rarity=Rare      OR
//! !card_type=Event  NOT
//! ```
//!
//! Because every token starts with a sigil, a predicate list encodes as the
//! plain concatenation of its tokens. Fields and values containing any of
//! `& | ! =` are rejected at encode time instead of being escaped.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::error::{DecodeError, EncodingError, TokenPart};
use super::predicate::{Predicate, PredicateKind};

pub const RESERVED: [char; 4] = ['&', '|', '!', '='];

fn check(part: TokenPart, text: &str) -> Result<(), EncodingError> {
    match text.chars().find(|ch| RESERVED.contains(ch)) {
        Some(ch) => Err(EncodingError::ReservedCharacter {
            part,
            text: text.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

/// Encode a single predicate. The label is not part of the token.
pub fn encode(predicate: &Predicate) -> Result<String, EncodingError> {
    if predicate.field.is_empty() {
        return Err(EncodingError::EmptyField);
    }
    check(TokenPart::Field, &predicate.field)?;
    check(TokenPart::Value, &predicate.value)?;

    let mut token = String::with_capacity(predicate.field.len() + predicate.value.len() + 2);
    token.push(predicate.kind.sigil());
    token.push_str(&predicate.field);
    token.push('=');
    token.push_str(&predicate.value);
    Ok(token)
}

/// Decode a single token. The decoded label equals the value.
pub fn decode(token: &str) -> Result<Predicate, DecodeError> {
    let mut chars = token.chars();
    let sigil = chars.next().ok_or(DecodeError::Empty)?;
    let kind = PredicateKind::from_sigil(sigil).ok_or(DecodeError::UnknownSigil(sigil))?;

    let body = chars.as_str();
    let (field, value) = body
        .split_once('=')
        .ok_or_else(|| DecodeError::MissingSeparator(token.to_string()))?;
    if field.is_empty() {
        return Err(DecodeError::EmptyField(token.to_string()));
    }

    Ok(Predicate::new(kind, field, value))
}

/// Encode a predicate list as concatenated tokens.
pub fn encode_all(predicates: &[Predicate]) -> Result<String, EncodingError> {
    let mut out = String::new();
    for predicate in predicates {
        out.push_str(&encode(predicate)?);
    }
    Ok(out)
}

/// Decode concatenated tokens. An empty string is an empty list.
pub fn decode_all(encoded: &str) -> Result<Vec<Predicate>, DecodeError> {
    let mut predicates = Vec::new();
    let mut start = None;

    for (index, ch) in encoded.char_indices() {
        if PredicateKind::from_sigil(ch).is_some() {
            if let Some(from) = start {
                predicates.push(decode(&encoded[from..index])?);
            }
            start = Some(index);
        } else if start.is_none() {
            return Err(DecodeError::UnknownSigil(ch));
        }
    }
    if let Some(from) = start {
        predicates.push(decode(&encoded[from..])?);
    }

    Ok(predicates)
}

/// URL-safe share form of a predicate list.
pub fn share_token(predicates: &[Predicate]) -> Result<String, EncodingError> {
    Ok(URL_SAFE_NO_PAD.encode(encode_all(predicates)?))
}

pub fn from_share_token(token: &str) -> Result<Vec<Predicate>, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| DecodeError::Share(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| DecodeError::Share(e.to_string()))?;
    decode_all(&text)
}
