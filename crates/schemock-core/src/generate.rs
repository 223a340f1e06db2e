//! The generation pipeline: slug derivation, prompt rendering, and decoding
//! of the model's freeform reply into records.
//!
//! Everything here is pure; the I/O lives in [`crate::service::creation`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
  Error, Result,
  schema::{FieldDefinition, FieldType},
};

/// Number of records requested from the model when not configured.
pub const DEFAULT_RECORD_COUNT: usize = 10;

/// Tunables for the schema-creation pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
  /// How many records the prompt asks for.
  pub record_count:       usize,
  /// Reject generated records whose keys or value types do not match the
  /// field definition.
  pub strict_conformance: bool,
}

impl Default for GenerationOptions {
  fn default() -> Self {
    Self {
      record_count:       DEFAULT_RECORD_COUNT,
      strict_conformance: false,
    }
  }
}

// ─── Slug ────────────────────────────────────────────────────────────────────

/// Lower-case `name`, collapse each whitespace run into a single `-`, and
/// append the Unix-millisecond timestamp of `at`.
pub fn derive_slug(name: &str, at: DateTime<Utc>) -> String {
  let base = name
    .split_whitespace()
    .map(str::to_lowercase)
    .collect::<Vec<_>>()
    .join("-");
  format!("{base}-{}", at.timestamp_millis())
}

// ─── Prompt ──────────────────────────────────────────────────────────────────

/// Render the instruction sent to the model.
pub fn build_prompt(fields: &FieldDefinition, record_count: usize) -> Result<String> {
  let schema_fields = serde_json::to_string_pretty(fields)?;
  Ok(format!(
    "You are a mock data generation expert.
Generate exactly {record_count} diverse, realistic records matching this JSON schema:

{schema_fields}

Guidelines:
- Respect each field's data type
- Create believable, varied, human-like values
- No explanations, no markdown, no code fences
- Return ONLY a valid JSON array of {record_count} objects
"
  ))
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Remove Markdown code-fence delimiters the model may have wrapped its
/// output in, then trim surrounding whitespace.
///
/// A fence is a run of three backticks or tildes. An opening fence may carry
/// an info string (`json`, `Json`, `javascript`, ...) and content may follow
/// it on the same line, as may a closing fence.
pub fn strip_code_fences(text: &str) -> String {
  text
    .trim()
    .lines()
    .map(strip_fence_line)
    .collect::<Vec<_>>()
    .join("\n")
    .trim()
    .to_owned()
}

const FENCES: [&str; 2] = ["```", "~~~"];

fn strip_fence_line(line: &str) -> &str {
  let mut line = line.trim();
  if let Some(rest) = FENCES.iter().find_map(|f| line.strip_prefix(*f)) {
    line = rest
      .trim_start_matches(['`', '~'])
      .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || "-_+.".contains(c))
      .trim_start();
  }
  if let Some(rest) = FENCES.iter().find_map(|f| line.strip_suffix(*f)) {
    line = rest.trim_end_matches(['`', '~']).trim_end();
  }
  line
}

/// Decode the model's raw reply into the list of generated records.
pub fn parse_generated(raw: &str) -> Result<Vec<Value>> {
  let text = strip_code_fences(raw);

  let value: Value = match serde_json::from_str(&text) {
    Ok(v) => v,
    Err(e) => {
      tracing::warn!(error = %e, raw = %text, "model returned invalid JSON");
      return Err(Error::GenerationFormat { raw: text });
    }
  };

  match value {
    Value::Array(items) if !items.is_empty() => Ok(items),
    _ => Err(Error::GenerationEmpty),
  }
}

// ─── Conformance ─────────────────────────────────────────────────────────────

/// Check that every generated record is an object with exactly the declared
/// fields, each holding a value of the declared type.
pub fn check_conformance(fields: &FieldDefinition, records: &[Value]) -> Result<()> {
  for (index, record) in records.iter().enumerate() {
    let non_conforming = |reason: String| Error::NonConforming { index, reason };

    let Value::Object(obj) = record else {
      return Err(non_conforming("not a JSON object".to_owned()));
    };

    for (name, ty) in fields.iter() {
      let value = obj
        .get(name)
        .ok_or_else(|| non_conforming(format!("missing field {name:?}")))?;
      if !value_matches(ty, value) {
        return Err(non_conforming(format!(
          "field {name:?} is not a valid {ty}"
        )));
      }
    }

    if let Some(extra) = obj.keys().find(|k| fields.get(k).is_none()) {
      return Err(non_conforming(format!("unexpected field {extra:?}")));
    }
  }
  Ok(())
}

fn value_matches(ty: FieldType, value: &Value) -> bool {
  match (ty, value) {
    (FieldType::String, Value::String(_)) => true,
    (FieldType::Number, Value::Number(_)) => true,
    (FieldType::Boolean, Value::Bool(_)) => true,
    (FieldType::Email, Value::String(s)) => is_email(s),
    (FieldType::Url, Value::String(s)) => {
      s.starts_with("http://") || s.starts_with("https://")
    }
    (FieldType::Date, Value::String(s)) => {
      NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
    }
    (FieldType::Phone, Value::String(s)) => is_phone(s),
    (FieldType::Address, Value::String(s)) => !s.trim().is_empty(),
    (FieldType::Address, Value::Object(_)) => true,
    _ => false,
  }
}

fn is_email(s: &str) -> bool {
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
    }
    None => false,
  }
}

fn is_phone(s: &str) -> bool {
  let allowed = |c: char| c.is_ascii_digit() || "+-(). ".contains(c);
  s.chars().all(allowed) && s.chars().filter(char::is_ascii_digit).count() >= 7
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn users() -> FieldDefinition {
    [
      ("username".to_owned(), FieldType::String),
      ("age".to_owned(), FieldType::Number),
    ]
    .into_iter()
    .collect()
  }

  // ── Slug ───────────────────────────────────────────────────────────────

  #[test]
  fn slug_lowercases_and_hyphenates() {
    let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    assert_eq!(derive_slug("My  Cool\tUsers", at), "my-cool-users-1700000000123");
  }

  #[test]
  fn slug_differs_for_same_name_at_different_times() {
    let a = Utc.timestamp_millis_opt(1).unwrap();
    let b = Utc.timestamp_millis_opt(2).unwrap();
    assert_ne!(derive_slug("Users", a), derive_slug("Users", b));
  }

  // ── Prompt ─────────────────────────────────────────────────────────────

  #[test]
  fn prompt_embeds_definition_and_count() {
    let prompt = build_prompt(&users(), 10).unwrap();
    assert!(prompt.contains("exactly 10"));
    assert!(prompt.contains("\"username\": \"string\""));
    assert!(prompt.contains("\"age\": \"number\""));
    let u = prompt.find("username").unwrap();
    let a = prompt.find("\"age\"").unwrap();
    assert!(u < a, "field order must be preserved");
  }

  // ── Fences ─────────────────────────────────────────────────────────────

  #[test]
  fn fenced_and_bare_output_parse_the_same() {
    let bare = r#"[{"username":"ana","age":30}]"#;
    let fenced = format!("```json\n{bare}\n```\n");
    let plain_fence = format!("  ```\n{bare}```");

    let expected = parse_generated(bare).unwrap();
    assert_eq!(parse_generated(&fenced).unwrap(), expected);
    assert_eq!(parse_generated(&plain_fence).unwrap(), expected);
  }

  #[test]
  fn any_fence_spelling_is_stripped() {
    let bare = r#"[{"username":"ana","age":30}]"#;
    let expected = parse_generated(bare).unwrap();

    let variants = [
      format!("```Json\n{bare}\n```"),
      format!("```javascript\n{bare}\n```"),
      format!("```JSON  \n{bare}\n```  "),
      format!("~~~\n{bare}\n~~~"),
      format!("~~~json\n{bare}\n~~~"),
      format!("````json\n{bare}\n````"),
      format!("```json {bare}```"),
    ];
    for text in variants {
      assert_eq!(parse_generated(&text).unwrap(), expected, "{text:?}");
    }
  }

  #[test]
  fn fence_stripping_keeps_inner_lines() {
    let text = "```json\n[\n  {\"a\": \"x`y\"}\n]\n```";
    assert_eq!(strip_code_fences(text), "[\n{\"a\": \"x`y\"}\n]");
  }

  // ── Parsing ────────────────────────────────────────────────────────────

  #[test]
  fn prose_is_a_format_error() {
    let err = parse_generated("Sure! Here are some users for you.").unwrap_err();
    assert!(matches!(err, Error::GenerationFormat { ref raw } if raw.starts_with("Sure!")));
    assert_eq!(err.to_string(), "Model returned invalid JSON format");
  }

  #[test]
  fn empty_array_and_object_are_empty_errors() {
    assert!(matches!(parse_generated("[]"), Err(Error::GenerationEmpty)));
    assert!(matches!(
      parse_generated(r#"{"username":"ana"}"#),
      Err(Error::GenerationEmpty)
    ));
  }

  #[test]
  fn parse_returns_every_element() {
    let items: Vec<_> = (0..10).map(|i| json!({"username": format!("u{i}"), "age": i})).collect();
    let text = serde_json::to_string(&items).unwrap();
    assert_eq!(parse_generated(&text).unwrap().len(), 10);
  }

  // ── Conformance ────────────────────────────────────────────────────────

  #[test]
  fn conforming_records_pass() {
    let records = vec![json!({"username": "ana", "age": 30})];
    check_conformance(&users(), &records).unwrap();
  }

  #[test]
  fn wrong_type_is_rejected() {
    let records = vec![
      json!({"username": "ana", "age": 30}),
      json!({"username": "bo", "age": "thirty"}),
    ];
    let err = check_conformance(&users(), &records).unwrap_err();
    assert!(matches!(err, Error::NonConforming { index: 1, .. }));
  }

  #[test]
  fn missing_and_extra_fields_are_rejected() {
    let missing = vec![json!({"username": "ana"})];
    assert!(check_conformance(&users(), &missing).is_err());

    let extra = vec![json!({"username": "ana", "age": 1, "admin": true})];
    assert!(check_conformance(&users(), &extra).is_err());
  }

  #[test]
  fn formatted_string_types() {
    let def: FieldDefinition = [
      ("email".to_owned(), FieldType::Email),
      ("site".to_owned(), FieldType::Url),
      ("born".to_owned(), FieldType::Date),
      ("phone".to_owned(), FieldType::Phone),
      ("home".to_owned(), FieldType::Address),
    ]
    .into_iter()
    .collect();

    let good = vec![json!({
      "email": "ana@example.com",
      "site":  "https://ana.dev",
      "born":  "1990-04-01",
      "phone": "+1 (555) 010-2030",
      "home":  {"street": "1 Main St", "city": "Springfield"},
    })];
    check_conformance(&def, &good).unwrap();

    let bad_email = vec![json!({
      "email": "ana.example.com",
      "site":  "https://ana.dev",
      "born":  "1990-04-01",
      "phone": "+1 555 010 2030",
      "home":  "1 Main St",
    })];
    assert!(check_conformance(&def, &bad_email).is_err());
  }
}
