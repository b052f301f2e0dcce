//! DSL statement builder for ProtonDB
//!
//! Each [`Statement`] renders to exactly one command line, e.g.
//! `db.create("school")` or `characters.print(age>=18)`. Building never
//! performs I/O.
//!
//! Identifiers (database, collection and profile names) are validated so that
//! they cannot break the command grammar. Filter conditions are a trust
//! boundary: [`Condition::raw`] fragments are inserted verbatim and the
//! server alone decides whether they are valid. [`field`] builds a condition
//! whose key is checked like any other name.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A document: field name to JSON value. No schema is enforced client-side.
pub type Document = Map<String, Value>;

fn name_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^\w+$").expect("static name pattern"))
}

/// Identifier that is safe to interpolate into a statement.
///
/// Collection names double as the object of document commands
/// (`characters.insert(...)`), so the accepted alphabet is the server's
/// `\w+`: letters, digits and underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
  pub fn new(name: impl Into<String>) -> Result<Self> {
    let name = name.into();
    if name_pattern().is_match(&name) {
      Ok(Self(name))
    } else {
      Err(Error::InvalidName(name))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Name {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<&str> for Name {
  type Error = Error;
  fn try_from(value: &str) -> Result<Self> {
    Self::new(value)
  }
}

impl TryFrom<String> for Name {
  type Error = Error;
  fn try_from(value: String) -> Result<Self> {
    Self::new(value)
  }
}

/// Filter fragment such as `age>=18`, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition(String);

impl Condition {
  /// Wrap a caller-written fragment. Not escaped or checked in any way.
  pub fn raw(fragment: impl Into<String>) -> Self {
    Self(fragment.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Condition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Condition {
  fn from(value: &str) -> Self {
    Self::raw(value)
  }
}

impl From<String> for Condition {
  fn from(value: String) -> Self {
    Self::raw(value)
  }
}

/// Field expression builder for the server's single comparison grammar:
/// `key(=|>|<|>=|<=)value`. The key follows the same rule as [`Name`].
pub struct Field {
  name: Name,
}

impl Field {
  pub fn new(name: impl Into<String>) -> Result<Self> {
    Ok(Self { name: Name::new(name)? })
  }

  fn compare(self, op: &str, value: Value) -> Condition {
    // strings keep their JSON quotes; the server strips them
    Condition(format!("{}{}{}", self.name, op, value))
  }

  pub fn eq(self, value: impl Into<Value>) -> Condition {
    self.compare("=", value.into())
  }

  pub fn gt(self, value: impl Into<Value>) -> Condition {
    self.compare(">", value.into())
  }

  pub fn gte(self, value: impl Into<Value>) -> Condition {
    self.compare(">=", value.into())
  }

  pub fn lt(self, value: impl Into<Value>) -> Condition {
    self.compare("<", value.into())
  }

  pub fn lte(self, value: impl Into<Value>) -> Condition {
    self.compare("<=", value.into())
  }
}

/// Create a field expression
pub fn field(name: impl Into<String>) -> Result<Field> {
  Field::new(name)
}

/// Update action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
  Add,
  Drop,
  Alter,
}

impl fmt::Display for UpdateAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UpdateAction::Add => write!(f, "add"),
      UpdateAction::Drop => write!(f, "drop"),
      UpdateAction::Alter => write!(f, "alter"),
    }
  }
}

/// Profile privilege level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Admin,
  User,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Admin => write!(f, "admin"),
      Role::User => write!(f, "user"),
    }
  }
}

/// One DSL command.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
  CreateDatabase(Name),
  UseDatabase(Name),
  DropDatabase(Option<Name>),
  ListDatabases,
  CreateCollection(Name),
  DropCollection(Name),
  ListCollections,
  Insert {
    collection: Name,
    payload: Value,
  },
  Print {
    collection: Name,
    condition: Option<Condition>,
  },
  Remove {
    collection: Name,
    condition: Option<Condition>,
  },
  Update {
    collection: Name,
    action: UpdateAction,
    payload: Document,
    condition: Option<Condition>,
  },
  CreateProfile {
    username: Name,
    password: String,
    role: Option<Role>,
  },
  DeleteProfile(Name),
  Grant {
    username: Name,
    database: Name,
  },
  Revoke {
    username: Name,
    database: Name,
  },
  ListProfiles,
  Help,
  Version,
  Clear,
  Quit,
}

fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Document> {
  match serde_json::to_value(value)? {
    Value::Object(map) => Ok(map),
    other => Err(Error::Serialization(format!(
      "document must be a JSON object, got {}",
      kind(&other)
    ))),
  }
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

impl Statement {
  pub fn create_db(name: &str) -> Result<Self> {
    Ok(Self::CreateDatabase(Name::new(name)?))
  }

  pub fn use_db(name: &str) -> Result<Self> {
    Ok(Self::UseDatabase(Name::new(name)?))
  }

  /// Drop the named database, or the current one when `name` is `None`.
  pub fn drop_db(name: Option<&str>) -> Result<Self> {
    Ok(Self::DropDatabase(name.map(Name::new).transpose()?))
  }

  pub fn list_databases() -> Self {
    Self::ListDatabases
  }

  pub fn create_collection(name: &str) -> Result<Self> {
    Ok(Self::CreateCollection(Name::new(name)?))
  }

  pub fn drop_collection(name: &str) -> Result<Self> {
    Ok(Self::DropCollection(Name::new(name)?))
  }

  pub fn list_collections() -> Self {
    Self::ListCollections
  }

  /// Insert a single document. `document` must serialize to a JSON object.
  pub fn insert<T: Serialize + ?Sized>(collection: &str, document: &T) -> Result<Self> {
    let collection = Name::new(collection)?;
    let payload = Value::Object(to_document(document)?);
    Ok(Self::Insert { collection, payload })
  }

  /// Insert several documents in one command.
  pub fn insert_many<T: Serialize>(collection: &str, documents: &[T]) -> Result<Self> {
    let collection = Name::new(collection)?;
    let payload = documents
      .iter()
      .map(|doc| to_document(doc).map(Value::Object))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self::Insert {
      collection,
      payload: Value::Array(payload),
    })
  }

  pub fn print(collection: &str, condition: Option<Condition>) -> Result<Self> {
    Ok(Self::Print {
      collection: Name::new(collection)?,
      condition,
    })
  }

  pub fn remove(collection: &str, condition: Option<Condition>) -> Result<Self> {
    Ok(Self::Remove {
      collection: Name::new(collection)?,
      condition,
    })
  }

  /// Update matching documents.
  ///
  /// For [`UpdateAction::Drop`] only the payload's keys are used; they name
  /// the fields to remove and the values (typically `null`) are ignored.
  pub fn update<T: Serialize + ?Sized>(
    collection: &str,
    action: UpdateAction,
    payload: &T,
    condition: Option<Condition>,
  ) -> Result<Self> {
    Ok(Self::Update {
      collection: Name::new(collection)?,
      action,
      payload: to_document(payload)?,
      condition,
    })
  }

  pub fn create_profile(username: &str, password: &str, role: Option<Role>) -> Result<Self> {
    if password.is_empty() || password.contains(['"', ',', '\n', '\r']) {
      return Err(Error::InvalidArgument(
        "password must be non-empty and free of quotes, commas and line breaks".to_string(),
      ));
    }
    Ok(Self::CreateProfile {
      username: Name::new(username)?,
      password: password.to_string(),
      role,
    })
  }

  pub fn delete_profile(username: &str) -> Result<Self> {
    Ok(Self::DeleteProfile(Name::new(username)?))
  }

  pub fn grant(username: &str, database: &str) -> Result<Self> {
    Ok(Self::Grant {
      username: Name::new(username)?,
      database: Name::new(database)?,
    })
  }

  pub fn revoke(username: &str, database: &str) -> Result<Self> {
    Ok(Self::Revoke {
      username: Name::new(username)?,
      database: Name::new(database)?,
    })
  }

  pub fn list_profiles() -> Self {
    Self::ListProfiles
  }

  pub fn help() -> Self {
    Self::Help
  }

  pub fn version() -> Self {
    Self::Version
  }

  pub fn clear() -> Self {
    Self::Clear
  }

  pub fn quit() -> Self {
    Self::Quit
  }

  /// Render to a DSL command line
  pub fn compile(&self) -> String {
    self.to_string()
  }
}

fn write_condition(f: &mut fmt::Formatter<'_>, condition: &Option<Condition>) -> fmt::Result {
  match condition {
    Some(condition) => write!(f, "{}", condition),
    None => Ok(()),
  }
}

impl fmt::Display for Statement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Statement::CreateDatabase(name) => write!(f, r#"db.create("{}")"#, name),
      Statement::UseDatabase(name) => write!(f, r#"db.use("{}")"#, name),
      Statement::DropDatabase(Some(name)) => write!(f, r#"db.drop("{}")"#, name),
      Statement::DropDatabase(None) => write!(f, "db.drop()"),
      Statement::ListDatabases => write!(f, "db.list()"),
      Statement::CreateCollection(name) => write!(f, r#"collection.create("{}")"#, name),
      Statement::DropCollection(name) => write!(f, r#"collection.drop("{}")"#, name),
      Statement::ListCollections => write!(f, "collection.list()"),
      Statement::Insert { collection, payload } => {
        write!(f, "{}.insert({})", collection, payload)
      }
      Statement::Print { collection, condition } => {
        write!(f, "{}.print(", collection)?;
        write_condition(f, condition)?;
        write!(f, ")")
      }
      Statement::Remove { collection, condition } => {
        write!(f, "{}.remove(", collection)?;
        write_condition(f, condition)?;
        write!(f, ")")
      }
      Statement::Update {
        collection,
        action,
        payload,
        condition,
      } => {
        write!(f, "{}.update({}, ", collection, action)?;
        match action {
          UpdateAction::Drop => {
            let keys: Vec<String> = payload
              .keys()
              .map(|key| Value::String(key.clone()).to_string())
              .collect();
            write!(f, "{{{}}}", keys.join(", "))?;
          }
          UpdateAction::Add | UpdateAction::Alter => {
            write!(f, "{}", Value::Object(payload.clone()))?;
          }
        }
        if let Some(condition) = condition {
          write!(f, ", {}", condition)?;
        }
        write!(f, ")")
      }
      Statement::CreateProfile {
        username,
        password,
        role,
      } => {
        write!(f, r#"profile.create("{}", "{}""#, username, password)?;
        if let Some(role) = role {
          write!(f, r#", "{}""#, role)?;
        }
        write!(f, ")")
      }
      Statement::DeleteProfile(username) => write!(f, r#"profile.delete("{}")"#, username),
      Statement::Grant { username, database } => {
        write!(f, r#"profile.grant("{}", "{}")"#, username, database)
      }
      Statement::Revoke { username, database } => {
        write!(f, r#"profile.revoke("{}", "{}")"#, username, database)
      }
      Statement::ListProfiles => write!(f, "profile.list()"),
      Statement::Help => write!(f, ":h"),
      Statement::Version => write!(f, ":v"),
      Statement::Clear => write!(f, "cls"),
      Statement::Quit => write!(f, ":q"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_simple_statements() {
    assert_eq!(Statement::create_db("school").unwrap().compile(), r#"db.create("school")"#);
    assert_eq!(Statement::list_databases().compile(), "db.list()");
    assert_eq!(Statement::drop_db(None).unwrap().compile(), "db.drop()");
  }

  #[test]
  fn test_print_with_condition() {
    let stmt = Statement::print("characters", Some(field("age").unwrap().gte(18))).unwrap();
    assert_eq!(stmt.compile(), "characters.print(age>=18)");
  }

  #[test]
  fn test_string_condition_is_quoted() {
    let cond = field("name").unwrap().eq("Anbu");
    assert_eq!(cond.as_str(), r#"name="Anbu""#);
  }

  #[test]
  fn test_update_drop_renders_keys() {
    let stmt = Statement::update("players", UpdateAction::Drop, &json!({"score": null}), None).unwrap();
    assert_eq!(stmt.compile(), r#"players.update(drop, {"score"})"#);
  }

  #[test]
  fn test_name_rejects_dsl_breakers() {
    for bad in ["", "a b", "a.b", "it's", "x(", "q\"", "a,b"] {
      assert!(Name::new(bad).is_err(), "{:?} should be rejected", bad);
    }
    assert!(Name::new("vada_chennai2").is_ok());
  }
}
