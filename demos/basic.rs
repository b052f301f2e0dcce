//! Basic example demonstrating ProtonDB Rust SDK usage over a socket session.
//!
//! Run against a local server: `RUST_LOG=protondb=debug cargo run --example basic`

use protondb::{field, Driver, ProtonDB, Role, UpdateAction};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> protondb::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // Connect and log in
  let client = ProtonDB::connect("localhost:9090", "admin123", "welcome").await?;
  if let Some(greeting) = &client.session().greeting {
    println!("Server says: {}", greeting);
  }

  // Databases
  let created = client.create_db("vadachennai").await?;
  println!("create_db: {} {:?}", created.status(), created.message());
  client.use_db("vadachennai").await?.into_result()?;
  println!("Using database: {:?}", client.current_database().await);

  // Collections
  client.create_collection("characters").await?.into_result()?;
  let collections = client.list_collections().await?;
  println!("Collections: {:?}", collections.result_lines());

  // Insert documents
  client
    .insert_document("characters", &json!({"name": "Anbu", "age": 30, "gang": "Rajan"}))
    .await?
    .into_result()?;
  client
    .insert_documents(
      "characters",
      &[
        json!({"name": "Chandra", "age": 28}),
        json!({"name": "Guna", "age": 17}),
      ],
    )
    .await?
    .into_result()?;

  // Query documents
  let adults = client.print_documents("characters", Some(field("age")?.gte(18))).await?;
  for line in adults.result_lines() {
    println!("Adult: {}", line);
  }

  // Update and remove
  client
    .update_documents("characters", UpdateAction::Alter, &json!({"age": 31}), Some(field("name")?.eq("Anbu")))
    .await?
    .into_result()?;
  client
    .update_documents("characters", UpdateAction::Drop, &json!({"gang": null}), None)
    .await?
    .into_result()?;
  client.remove_documents("characters", Some(field("age")?.lt(18))).await?.into_result()?;

  // Profiles
  client.create_profile("anbu", "carrom", Some(Role::User)).await?.into_result()?;
  client.grant_access("anbu", "vadachennai").await?.into_result()?;
  println!("Profiles: {:?}", client.list_profiles().await?.result_lines());

  // Server-side debugging
  client.set_debug(true).await?;
  let profile = client.server_profile().await?;
  println!("Server profile: {:?}", profile.result());

  client.close().await;
  println!("Disconnected");
  Ok(())
}
