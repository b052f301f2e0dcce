//! One method per DSL operation, shared by both clients.
//!
//! The associated `Output` keeps the two transports honest: a socket client
//! yields a [`Response`](crate::Response) with a real status, a shell client
//! yields [`Captured`](crate::Captured) lines with none.

use serde::Serialize;

use crate::error::Result;
use crate::query::{Condition, Role, Statement, UpdateAction};

#[allow(async_fn_in_trait)]
pub trait Driver {
  type Output;

  /// Send one statement and wait for its result.
  async fn execute(&self, statement: Statement) -> Result<Self::Output>;

  /// Send a caller-written DSL line as is. Nothing is validated.
  async fn execute_raw(&self, dsl: &str) -> Result<Self::Output>;

  /// `Err(Error::Closed)` once the client has been closed.
  async fn ensure_open(&self) -> Result<()>;

  /// Build a statement and execute it. A closed client reports
  /// [`Error::Closed`](crate::Error::Closed) before the arguments are checked.
  async fn execute_with<F>(&self, build: F) -> Result<Self::Output>
  where
    F: FnOnce() -> Result<Statement>,
  {
    self.ensure_open().await?;
    self.execute(build()?).await
  }

  // Databases

  async fn create_db(&self, name: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::create_db(name)).await
  }

  async fn use_db(&self, name: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::use_db(name)).await
  }

  /// Drop `name`, or the current database when `None`.
  async fn drop_db(&self, name: Option<&str>) -> Result<Self::Output> {
    self.execute_with(|| Statement::drop_db(name)).await
  }

  async fn list_databases(&self) -> Result<Self::Output> {
    self.execute(Statement::list_databases()).await
  }

  // Collections

  async fn create_collection(&self, name: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::create_collection(name)).await
  }

  async fn drop_collection(&self, name: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::drop_collection(name)).await
  }

  async fn list_collections(&self) -> Result<Self::Output> {
    self.execute(Statement::list_collections()).await
  }

  // Documents

  async fn insert_document<T>(&self, collection: &str, document: &T) -> Result<Self::Output>
  where
    T: Serialize + ?Sized,
  {
    self.execute_with(|| Statement::insert(collection, document)).await
  }

  async fn insert_documents<T>(&self, collection: &str, documents: &[T]) -> Result<Self::Output>
  where
    T: Serialize,
  {
    self.execute_with(|| Statement::insert_many(collection, documents)).await
  }

  async fn print_documents(
    &self,
    collection: &str,
    condition: Option<Condition>,
  ) -> Result<Self::Output> {
    self.execute_with(|| Statement::print(collection, condition)).await
  }

  async fn remove_documents(
    &self,
    collection: &str,
    condition: Option<Condition>,
  ) -> Result<Self::Output> {
    self.execute_with(|| Statement::remove(collection, condition)).await
  }

  async fn update_documents<T>(
    &self,
    collection: &str,
    action: UpdateAction,
    payload: &T,
    condition: Option<Condition>,
  ) -> Result<Self::Output>
  where
    T: Serialize + ?Sized,
  {
    self.execute_with(|| Statement::update(collection, action, payload, condition)).await
  }

  // Profiles

  async fn create_profile(
    &self,
    username: &str,
    password: &str,
    role: Option<Role>,
  ) -> Result<Self::Output> {
    self.execute_with(|| Statement::create_profile(username, password, role)).await
  }

  async fn delete_profile(&self, username: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::delete_profile(username)).await
  }

  async fn grant_access(&self, username: &str, database: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::grant(username, database)).await
  }

  async fn revoke_access(&self, username: &str, database: &str) -> Result<Self::Output> {
    self.execute_with(|| Statement::revoke(username, database)).await
  }

  async fn list_profiles(&self) -> Result<Self::Output> {
    self.execute(Statement::list_profiles()).await
  }

  // Console utilities

  async fn help(&self) -> Result<Self::Output> {
    self.execute(Statement::help()).await
  }

  async fn version(&self) -> Result<Self::Output> {
    self.execute(Statement::version()).await
  }

  async fn clear(&self) -> Result<Self::Output> {
    self.execute(Statement::clear()).await
  }
}
