use chrono::NaiveDate;
use log::warn;
use serde_json::Value;
use thiserror::Error;

use crate::profile::ResolvedProfile;
use crate::template::{classify, extract_tokens, format_date, Token};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown collection \"{collection}\" in placeholder \"{path}\"")]
    UnknownCollection { path: String, collection: String },
    #[error("cannot resolve segment \"{segment}\" of placeholder \"{path}\": {reason}")]
    Segment {
        path: String,
        segment: String,
        reason: String,
    },
    #[error("placeholder \"{path}\" is ambiguous: it resolves to {count} values")]
    Ambiguous { path: String, count: usize },
    #[error("placeholder \"{path}\" does not resolve to a single scalar value")]
    NotScalar { path: String },
    #[error("failed to serialize the {collection} record for placeholder lookup")]
    Serialize {
        collection: String,
        source: serde_json::Error,
    },
}

/// Resolves `{{...}}` placeholder tokens against one resolved profile and a
/// fixed "now". A pure pipeline — extract, classify, resolve, substitute —
/// with no state kept between calls.
///
/// Dotted paths are interpreted by a closed walker over the profile graph:
/// named collections, record fields, and numeric indices only. Nothing in a
/// template is ever evaluated as code.
pub struct PlaceholderResolver<'a> {
    profile: &'a ResolvedProfile,
    now: NaiveDate,
}

impl<'a> PlaceholderResolver<'a> {
    pub fn new(profile: &'a ResolvedProfile, now: NaiveDate) -> Self {
        Self { profile, now }
    }

    /// Substitutes every resolvable token in `text`. Tokens that do not
    /// classify are left verbatim so that templates written for a future
    /// version keep working; failures inside a classified token are errors.
    pub fn render(&self, text: &str) -> Result<String, TemplateError> {
        let mut result = text.to_string();

        for raw in extract_tokens(text) {
            let resolution = match classify(raw) {
                Ok(Token::Path(path)) => self.resolve_path(path)?,
                Ok(Token::DateFormat(pattern)) => format_date(self.now, pattern),
                Err(e) => {
                    warn!("leaving token untouched: {}", e);
                    continue;
                }
            };

            result = result.replace(&format!("{{{{{raw}}}}}"), &resolution);
        }

        Ok(result)
    }

    fn collection_root(&self, path: &str, collection: &str) -> Result<Value, TemplateError> {
        let record = match collection {
            "profile" => serde_json::to_value(self.profile.profile()),
            "provider" => serde_json::to_value(self.profile.provider()),
            "client" => serde_json::to_value(self.profile.client()),
            "recipient" => serde_json::to_value(self.profile.recipient()),
            "params" | "default_param" => serde_json::to_value(self.profile.params()),
            _ => {
                return Err(TemplateError::UnknownCollection {
                    path: path.to_string(),
                    collection: collection.to_string(),
                })
            }
        };

        let record = record.map_err(|source| TemplateError::Serialize {
            collection: collection.to_string(),
            source,
        })?;

        // the profile scopes each collection down to exactly one record, so
        // the root is a one-element sequence: `provider.0.name` indexes it,
        // `provider.name` maps over it
        Ok(Value::Array(vec![record]))
    }

    fn resolve_path(&self, path: &str) -> Result<String, TemplateError> {
        let mut segments = path.split('.');
        let collection = segments.next().expect("split always yields a segment");

        let mut current = self.collection_root(path, collection)?;
        for segment in segments {
            current = walk_segment(current, segment, path)?;
        }

        finalize(current, path)
    }
}

fn segment_error(path: &str, segment: &str, reason: impl Into<String>) -> TemplateError {
    TemplateError::Segment {
        path: path.to_string(),
        segment: segment.to_string(),
        reason: reason.into(),
    }
}

/// Splits `name[3]` into `("name", Some(3))`; plain segments pass through.
/// Call-like suffixes are refused: paths dereference data, they never call.
fn split_index_suffix<'a>(
    segment: &'a str,
    path: &str,
) -> Result<(&'a str, Option<usize>), TemplateError> {
    if segment.contains('(') || segment.contains(')') {
        return Err(segment_error(
            path,
            segment,
            "call expressions are not supported in placeholders",
        ));
    }

    let Some(open) = segment.find('[') else {
        if segment.contains(']') {
            return Err(segment_error(path, segment, "unmatched `]`"));
        }
        return Ok((segment, None));
    };

    let Some(inner) = segment[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(segment_error(path, segment, "malformed index suffix"));
    };

    let index: usize = inner
        .parse()
        .map_err(|_| segment_error(path, segment, "index must be a non-negative integer"))?;

    Ok((&segment[..open], Some(index)))
}

fn index_into(value: Value, index: usize, segment: &str, path: &str) -> Result<Value, TemplateError> {
    match value {
        Value::Array(mut items) => {
            if index >= items.len() {
                return Err(segment_error(
                    path,
                    segment,
                    format!("index {} out of bounds (length {})", index, items.len()),
                ));
            }
            Ok(items.swap_remove(index))
        }
        _ => Err(segment_error(path, segment, "cannot index a non-sequence")),
    }
}

fn field_of(value: Value, field: &str, segment: &str, path: &str) -> Result<Value, TemplateError> {
    match value {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| segment_error(path, segment, format!("no field \"{}\"", field))),
        // field access on a sequence maps over its elements; a singleton
        // result unwraps right away so a following index or segment applies
        // to the value, not to the wrapper
        Value::Array(items) => {
            let mut mapped = Vec::with_capacity(items.len());
            for item in items {
                mapped.push(field_of(item, field, segment, path)?);
            }
            if mapped.len() == 1 {
                Ok(mapped.pop().expect("length was checked"))
            } else {
                Ok(Value::Array(mapped))
            }
        }
        _ => Err(segment_error(
            path,
            segment,
            "cannot access a field of a scalar value",
        )),
    }
}

fn walk_segment(current: Value, segment: &str, path: &str) -> Result<Value, TemplateError> {
    let (name, index) = split_index_suffix(segment, path)?;

    let mut value = if name.chars().all(|c| c.is_ascii_digit()) && !name.is_empty() {
        let position: usize = name
            .parse()
            .map_err(|_| segment_error(path, segment, "index must be a non-negative integer"))?;
        index_into(current, position, segment, path)?
    } else {
        field_of(current, name, segment, path)?
    };

    if let Some(index) = index {
        value = index_into(value, index, segment, path)?;
    }

    Ok(value)
}

fn finalize(value: Value, path: &str) -> Result<String, TemplateError> {
    // a single-element sequence unwraps to its scalar; more than one value
    // would make the substitution ambiguous
    let value = match value {
        Value::Array(mut items) => match items.len() {
            1 => items.pop().expect("length was checked"),
            count => {
                return Err(TemplateError::Ambiguous {
                    path: path.to_string(),
                    count,
                })
            }
        },
        value => value,
    };

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(TemplateError::NotScalar {
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn resolve_in(root: Value, path: &str) -> Result<String, TemplateError> {
        let mut current = Value::Array(vec![root]);
        let mut segments = path.split('.');
        segments.next(); // collection name, already consumed by the caller
        for segment in segments {
            current = walk_segment(current, segment, path)?;
        }
        finalize(current, path)
    }

    fn provider() -> Value {
        json!({
            "id": 0,
            "name": "Acme",
            "datas": [
                {"label": "name", "value": "Acme", "location": "b3"},
                {"label": "abn", "value": "123456789", "location": "b5"},
            ],
        })
    }

    #[test]
    fn test_field_access() {
        assert_eq!(resolve_in(provider(), "provider.name").unwrap(), "Acme");
        assert_eq!(resolve_in(provider(), "provider.id").unwrap(), "0");
    }

    #[test]
    fn test_numeric_index_selects_record() {
        assert_eq!(resolve_in(provider(), "provider.0.name").unwrap(), "Acme");
    }

    #[test]
    fn test_index_suffix() {
        assert_eq!(
            resolve_in(provider(), "provider.datas[1].value").unwrap(),
            "123456789"
        );
    }

    #[test]
    fn test_mapping_over_sequence_is_ambiguous() {
        let err = resolve_in(provider(), "provider.datas.label").unwrap_err();
        assert!(matches!(err, TemplateError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_call_suffix_is_refused() {
        let err = resolve_in(provider(), "provider.name[0].lower()").unwrap_err();
        assert!(matches!(err, TemplateError::Segment { .. }));
    }

    #[test]
    fn test_missing_field() {
        let err = resolve_in(provider(), "provider.nope").unwrap_err();
        assert!(matches!(err, TemplateError::Segment { .. }));
    }

    #[test]
    fn test_object_result_is_not_scalar() {
        let err = resolve_in(provider(), "provider.datas[0]").unwrap_err();
        assert!(matches!(err, TemplateError::NotScalar { .. }));
    }
}
