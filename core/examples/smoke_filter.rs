use jt_core::{CoreEngine, CoreOptions};

fn main() -> Result<(), String> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .init();

  let mut args = std::env::args().skip(1);
  let usage = "usage: cargo run -p jt_core --example smoke_filter -- <path-to-json> <filter>";
  let path = args.next().ok_or_else(|| usage.to_string())?;
  let filter = args.next().ok_or_else(|| usage.to_string())?;

  let text = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
  let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;

  let eng = CoreEngine::new(CoreOptions::default());
  let (session, _) = eng.open_document(&value);
  let rows = eng
    .apply_filter(&session.session_id, &filter)
    .map_err(|e| e.to_string())?;
  println!("filter={filter:?} rows={rows}");

  let mut cursor: Option<String> = None;
  loop {
    let page = eng
      .next_page(&session.session_id, cursor.as_deref(), 20)
      .map_err(|e| e.to_string())?;
    for row in &page.rows {
      let path: Vec<String> = row.path.iter().map(|s| s.to_string()).collect();
      println!("{:>4} {} = {}", row.index, path.join("."), row.preview);
    }
    if page.reached_end {
      break;
    }
    cursor = page.next_cursor;
  }
  Ok(())
}
