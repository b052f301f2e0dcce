//! Response parsing for both transports.
//!
//! Socket sessions get a [`Response`]: a parsed JSON object with a status
//! discriminant. Shell sessions only get [`Captured`] output lines, which
//! carry no status at all; callers have to inspect the text themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::STATUS_OK;

/// Structured server reply from a socket session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  #[serde(rename = "Status", alias = "status")]
  pub status: String,
  #[serde(rename = "Message", alias = "message", default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(rename = "Result", alias = "result", default, skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
}

impl Response {
  /// Parse one response line.
  ///
  /// Malformed JSON, a non-object value or a missing status field is a
  /// [`Error::Protocol`]. A well-formed reply with a failing status is not an
  /// error here; check [`Response::is_success`].
  pub fn parse(line: &str) -> Result<Self> {
    let malformed = |e: serde_json::Error| {
      Error::Protocol(format!("malformed response {:?}: {}", truncate(line), e))
    };
    let value: Value = serde_json::from_str(line.trim()).map_err(malformed)?;
    if !value.is_object() {
      return Err(Error::Protocol(format!(
        "expected a JSON object, got {:?}",
        truncate(line)
      )));
    }
    serde_json::from_value(value).map_err(malformed)
  }

  pub fn is_success(&self) -> bool {
    self.status.eq_ignore_ascii_case(STATUS_OK)
  }

  pub fn status(&self) -> &str {
    &self.status
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref().filter(|m| !m.is_empty())
  }

  pub fn result(&self) -> Option<&Value> {
    self.result.as_ref().filter(|v| !v.is_null())
  }

  /// The result payload as a list of strings, which is what the reference
  /// server produces for every query.
  pub fn result_lines(&self) -> Vec<String> {
    match self.result() {
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| match item {
          Value::String(s) => s.clone(),
          other => other.to_string(),
        })
        .collect(),
      Some(Value::String(s)) => vec![s.clone()],
      Some(other) => vec![other.to_string()],
      None => Vec::new(),
    }
  }

  /// Turn a failing status into [`Error::Server`], for callers that want `?`.
  pub fn into_result(self) -> Result<Self> {
    if self.is_success() {
      Ok(self)
    } else {
      let detail = self
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("status {:?}", self.status));
      Err(Error::Server(detail))
    }
  }
}

fn truncate(line: &str) -> &str {
  const LIMIT: usize = 120;
  if line.len() <= LIMIT {
    return line;
  }
  let mut end = LIMIT;
  while !line.is_char_boundary(end) {
    end -= 1;
  }
  &line[..end]
}

/// Lines a shell process printed during one capture window.
///
/// This is not a reply to the command that opened the window. Output that
/// arrives after the settle delay lands in the next window, and the window may
/// also hold leftovers from an earlier command or debug chatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
  lines: Vec<String>,
}

impl Captured {
  pub fn new(lines: Vec<String>) -> Self {
    Self { lines }
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn into_lines(self) -> Vec<String> {
    self.lines
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  /// True if any captured line contains `needle`.
  pub fn contains(&self, needle: &str) -> bool {
    self.lines.iter().any(|line| line.contains(needle))
  }
}

impl From<Vec<String>> for Captured {
  fn from(lines: Vec<String>) -> Self {
    Self::new(lines)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_respects_char_boundary() {
    let line = "é".repeat(100);
    let cut = truncate(&line);
    assert!(cut.len() <= 120);
    assert!(line.starts_with(cut));
  }

  #[test]
  fn test_result_lines_from_mixed_array() {
    let response = Response::parse(r#"{"Status":"ok","Result":["a",1,{"k":true}]}"#).unwrap();
    assert_eq!(response.result_lines(), vec!["a", "1", r#"{"k":true}"#]);
  }

  #[test]
  fn test_empty_message_is_none() {
    let response = Response::parse(r#"{"Status":"ok","Message":""}"#).unwrap();
    assert!(response.message().is_none());
  }
}
