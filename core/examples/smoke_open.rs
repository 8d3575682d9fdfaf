use std::path::PathBuf;

use jt_core::{CoreEngine, CoreOptions};

fn main() -> Result<(), String> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  let path = std::env::args()
    .nth(1)
    .ok_or_else(|| "usage: cargo run -p jt_core --example smoke_open -- <path-to-json>".to_string())?;
  let path = PathBuf::from(path);

  let text = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
  let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;

  let eng = CoreEngine::new(CoreOptions {
    default_page_size: 5,
    ..CoreOptions::default()
  });
  let (session, p1) = eng.open_document(&value);
  println!("nodes={}", session.node_count);
  println!("rows={}", session.total_visible_rows);
  for row in &p1.rows {
    println!("{:>4} {}{:?} {}", row.index, " ".repeat(row.indent), row.key, row.preview);
  }

  let all = eng
    .set_expanded_all(&session.session_id, true)
    .map_err(|e| e.to_string())?;
  println!("rows.expanded={all}");
  Ok(())
}
