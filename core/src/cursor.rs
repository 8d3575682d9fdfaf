use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Resume point for row paging: the iterator index-path of the last row handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RowCursor {
  pub session_id: String,
  pub index_path: Vec<usize>,
  pub generation: u64,
}

pub(crate) fn encode_cursor(c: &RowCursor) -> String {
  let json = serde_json::to_vec(c).unwrap_or_default();
  base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
}

/// Absent or empty token means "from the first row".
pub(crate) fn decode_cursor(token: Option<&str>) -> Result<Option<RowCursor>, crate::engine::CoreError> {
  match token {
    None => Ok(None),
    Some(t) if t.is_empty() => Ok(None),
    Some(t) => {
      let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(t)
        .map_err(|e| crate::engine::CoreError::BadCursor(e.to_string()))?;
      let c: RowCursor = serde_json::from_slice(&bytes)
        .map_err(|e| crate::engine::CoreError::BadCursor(e.to_string()))?;
      if c.index_path.is_empty() {
        return Err(crate::engine::CoreError::BadCursor("empty index path".into()));
      }
      Ok(Some(c))
    }
  }
}
