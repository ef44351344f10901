//! Rule-string parsing.
//!
//! The authoring format is the familiar pipe-separated string. The internal
//! representation is a typed enum so the evaluator never re-inspects raw
//! tokens. Unknown rule names are skipped with a warning; they are not an
//! error, but the accepted vocabulary is exactly the variants below.

/// A single typed validation rule.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Email,
    /// Minimum: character count for text fields, numeric bound when the
    /// rule set also carries [`Rule::Numeric`] or [`Rule::Integer`].
    Min(f64),
    /// Maximum, same dual interpretation as [`Rule::Min`].
    Max(f64),
    Numeric,
    Integer,
    /// Membership in a fixed value list (`in:a,b,c`).
    In(Vec<String>),
    /// No other row may hold this value. `column` defaults to the field
    /// name when the rule is written as `unique:table`.
    Unique {
        table: String,
        column: Option<String>,
    },
    /// `field` must equal `field_confirmation`.
    Confirmed,
    Regex(regex::Regex),
    /// Plain string field (`string`). Accepts anything present; kept so
    /// rule strings from the original forms parse without warnings.
    Text,
    /// An uploaded file must be present.
    File,
    /// Uploaded file must be a jpg/jpeg/png/gif image within the size cap.
    Image,
}

/// Parse a pipe-separated rule string into typed rules.
///
/// Malformed arguments (a non-numeric `min:` bound, an invalid `regex:`
/// pattern) drop the single affected rule with a warning rather than
/// poisoning the whole field.
pub fn parse_rules(spec: &str) -> Vec<Rule> {
    spec.split('|')
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Option<Rule> {
    let (name, arg) = match token.split_once(':') {
        Some((name, arg)) => (name, Some(arg)),
        None => (token, None),
    };

    match name {
        "required" => Some(Rule::Required),
        "email" => Some(Rule::Email),
        "min" => parse_bound(token, arg).map(Rule::Min),
        "max" => parse_bound(token, arg).map(Rule::Max),
        "numeric" => Some(Rule::Numeric),
        "integer" => Some(Rule::Integer),
        "in" => {
            let values: Vec<String> = arg
                .unwrap_or("")
                .split(',')
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect();
            if values.is_empty() {
                tracing::warn!(rule = token, "'in' rule without values, skipping");
                return None;
            }
            Some(Rule::In(values))
        }
        "unique" => {
            let arg = arg.unwrap_or("");
            let (table, column) = match arg.split_once(',') {
                Some((table, column)) => (table, Some(column.to_owned())),
                None => (arg, None),
            };
            if table.is_empty() {
                tracing::warn!(rule = token, "'unique' rule without a table, skipping");
                return None;
            }
            Some(Rule::Unique {
                table: table.to_owned(),
                column,
            })
        }
        "confirmed" => Some(Rule::Confirmed),
        "regex" => {
            // The pattern is everything after the first ':', colons included.
            let pattern = arg.unwrap_or("");
            match regex::Regex::new(pattern) {
                Ok(re) => Some(Rule::Regex(re)),
                Err(err) => {
                    tracing::warn!(rule = token, %err, "invalid 'regex' pattern, skipping");
                    None
                }
            }
        }
        "string" => Some(Rule::Text),
        "file" => Some(Rule::File),
        "image" => Some(Rule::Image),
        other => {
            tracing::warn!(rule = other, "unknown validation rule, skipping");
            None
        }
    }
}

fn parse_bound(token: &str, arg: Option<&str>) -> Option<f64> {
    match arg.and_then(|a| a.parse::<f64>().ok()) {
        Some(bound) => Some(bound),
        None => {
            tracing::warn!(rule = token, "missing or non-numeric bound, skipping");
            None
        }
    }
}
