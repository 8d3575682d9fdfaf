use regex::{Regex, RegexBuilder};

use crate::{
  engine::CoreError,
  models::JsonPathSegment,
  tree::{JsonNode, LeafValue},
};

/// Compiled match predicate for the filter pass.
///
/// Regex tests (case-insensitive) apply to object keys and string values. Array indices,
/// numbers and booleans must equal the filter text exactly, so `"03"` does not match index 3
/// and `"TRUE"` does not match `true`.
#[derive(Debug, Clone)]
pub struct NodeFilter {
  re: Regex,
  text: String,
}

impl NodeFilter {
  /// Compile `pattern` as a regular expression.
  pub fn new(pattern: &str) -> Result<Self, CoreError> {
    Self::build(pattern, pattern)
  }

  /// Match `text` literally (regex metacharacters escaped).
  pub fn literal(text: &str) -> Result<Self, CoreError> {
    Self::build(&regex::escape(text), text)
  }

  fn build(pattern: &str, text: &str) -> Result<Self, CoreError> {
    let re = RegexBuilder::new(pattern)
      .case_insensitive(true)
      .build()
      .map_err(CoreError::InvalidPattern)?;
    Ok(Self {
      re,
      text: text.to_string(),
    })
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn matches(&self, node: &JsonNode) -> bool {
    let key_hit = match node.key() {
      None => return true,
      Some(JsonPathSegment::Index(i)) => self.text == i.to_string(),
      Some(JsonPathSegment::Key(k)) => self.re.is_match(k),
    };
    key_hit || self.value_matches(node.leaf())
  }

  fn value_matches(&self, leaf: Option<&LeafValue>) -> bool {
    match leaf {
      Some(LeafValue::String(s)) => self.re.is_match(s),
      Some(LeafValue::Number(n)) => n.to_string() == self.text,
      Some(LeafValue::Boolean(b)) => self.text == b.to_string(),
      Some(LeafValue::Null) | None => false,
    }
  }
}
