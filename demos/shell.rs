//! Driving a local ProtonDB console through its stdin/stdout.
//!
//! `cargo run --example shell -- /path/to/protondb`

use std::time::Duration;

use protondb::{field, Driver, ProtonShell, ShellOptions};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> protondb::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let executable = std::env::args().nth(1).unwrap_or_else(|| "protondb".to_string());
  let shell = ProtonShell::spawn_with_options(
    ShellOptions::new(executable).with_settle_delay(Duration::from_millis(750)),
  )?;

  println!("{:?}", shell.version().await?.lines());

  shell.create_db("school").await?;
  shell.use_db("school").await?;
  shell.create_collection("students").await?;
  shell
    .insert_document("students", &json!({"name": "Meena", "grade": 9}))
    .await?;

  // Output printed after the settle delay shows up in a later capture
  let captured = shell.print_documents("students", Some(field("grade")?.gte(9))).await?;
  for line in captured.lines() {
    println!("{}", line);
  }

  shell.close().await;
  Ok(())
}
