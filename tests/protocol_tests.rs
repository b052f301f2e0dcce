//! Wire encoding and response parsing tests for ProtonDB Rust SDK.

use protondb::protocol::*;
use protondb::{Credentials, Error, LoginFormat, Response};
use serde_json::{json, Value};

#[test]
fn test_protocol_constants() {
  assert_eq!(DEFAULT_PORT, 9090);
  assert_eq!(LINE_DELIMITER, b'\n');
  assert_eq!(MAX_LINE_SIZE, 16 * 1024 * 1024);
}

#[test]
fn test_query_request_serialization() {
  let line = Request::query(r#"db.create("school")"#).to_line().unwrap();
  assert!(!line.contains('\n'));

  let value: Value = serde_json::from_str(&line).unwrap();
  assert_eq!(value, json!({"Command": "QUERY", "Data": "db.create(\"school\")"}));
}

#[test]
fn test_request_without_data_omits_field() {
  let line = Request::fetch().to_line().unwrap();
  assert_eq!(line, r#"{"Command":"FETCH"}"#);

  let line = Request::quit().to_line().unwrap();
  assert_eq!(line, r#"{"Command":"QUIT"}"#);
}

#[test]
fn test_debug_and_profile_requests() {
  assert_eq!(Request::debug(true).data.as_deref(), Some("true"));
  assert_eq!(Request::debug(false).data.as_deref(), Some("false"));
  assert_eq!(Request::profile().command, ServerCommand::Profile);
}

#[test]
fn test_multiline_query_stays_on_one_line() {
  let line = Request::query("a\nb").to_line().unwrap();
  assert!(!line.contains('\n'));
  let parsed: Request = serde_json::from_str(&line).unwrap();
  assert_eq!(parsed.data.as_deref(), Some("a\nb"));
}

#[test]
fn test_server_command_names() {
  let all = [
    (ServerCommand::Login, "LOGIN"),
    (ServerCommand::Query, "QUERY"),
    (ServerCommand::Fetch, "FETCH"),
    (ServerCommand::Debug, "DEBUG"),
    (ServerCommand::Profile, "PROFILE"),
    (ServerCommand::Quit, "QUIT"),
  ];
  for (command, name) in all {
    assert_eq!(command.as_str(), name);
    assert_eq!(command.to_string(), name);
    assert_eq!(serde_json::to_value(command).unwrap(), json!(name));
  }
}

#[test]
fn test_login_formats() {
  let creds = Credentials::new("admin123", "welcome");
  assert_eq!(LoginFormat::CommaSeparated.encode(&creds).unwrap(), "admin123,welcome");

  let encoded: Value = serde_json::from_str(&LoginFormat::Json.encode(&creds).unwrap()).unwrap();
  assert_eq!(encoded, json!({"username": "admin123", "password": "welcome"}));
}

#[test]
fn test_comma_separated_login_rejects_commas() {
  for creds in [Credentials::new("admin,123", "welcome"), Credentials::new("admin123", "wel,come")] {
    assert!(matches!(
      LoginFormat::CommaSeparated.encode(&creds),
      Err(Error::InvalidArgument(_))
    ));
  }

  let creds = Credentials::new("admin123", "wel,come");
  let encoded: Value = serde_json::from_str(&LoginFormat::Json.encode(&creds).unwrap()).unwrap();
  assert_eq!(encoded["password"], "wel,come");
}

#[test]
fn test_credentials_debug_redacts_password() {
  let creds = Credentials::new("admin123", "welcome");
  let shown = format!("{:?}", creds);
  assert!(shown.contains("admin123"));
  assert!(!shown.contains("welcome"));
}

#[test]
fn test_parse_success_response() {
  let response = Response::parse(r#"{"Status":"ok","Message":"Login successful"}"#).unwrap();
  assert!(response.is_success());
  assert_eq!(response.status(), "ok");
  assert_eq!(response.message(), Some("Login successful"));
  assert!(response.result().is_none());
}

#[test]
fn test_status_is_case_insensitive() {
  for status in ["ok", "OK", "Ok", "oK"] {
    let line = json!({"Status": status}).to_string();
    assert!(Response::parse(&line).unwrap().is_success(), "{}", status);
  }
  for status in ["error", "fail", "okay", ""] {
    let line = json!({"Status": status}).to_string();
    assert!(!Response::parse(&line).unwrap().is_success(), "{}", status);
  }
}

#[test]
fn test_lowercase_field_names_accepted() {
  let response = Response::parse(r#"{"status":"ok","message":"hi","result":[1]}"#).unwrap();
  assert!(response.is_success());
  assert_eq!(response.message(), Some("hi"));
  assert_eq!(response.result(), Some(&json!([1])));
}

#[test]
fn test_result_payload_is_structured() {
  let response = Response::parse(
    r#"{"Status":"ok","Message":"","Result":["{\"name\":\"Anbu\",\"age\":30}","done"]}"#,
  )
  .unwrap();
  assert_eq!(
    response.result_lines(),
    vec![r#"{"name":"Anbu","age":30}"#.to_string(), "done".to_string()]
  );

  let response = Response::parse(r#"{"Status":"ok","Result":{"count":2}}"#).unwrap();
  assert_eq!(response.result(), Some(&json!({"count": 2})));

  let response = Response::parse(r#"{"Status":"ok","Result":null}"#).unwrap();
  assert!(response.result().is_none());
  assert!(response.result_lines().is_empty());
}

#[test]
fn test_server_failure_is_not_an_error() {
  let response =
    Response::parse(r#"{"Status":"error","Message":"Invalid username or password"}"#).unwrap();
  assert!(!response.is_success());
  assert_eq!(response.message(), Some("Invalid username or password"));

  match response.into_result() {
    Err(Error::Server(msg)) => assert_eq!(msg, "Invalid username or password"),
    other => panic!("Expected Server error, got: {:?}", other),
  }
}

#[test]
fn test_into_result_passes_success_through() {
  let response = Response::parse(r#"{"Status":"ok"}"#).unwrap();
  assert!(response.into_result().is_ok());
}

#[test]
fn test_malformed_responses_are_protocol_errors() {
  let bad = [
    "",
    "not json",
    "Connected to ProtonDB. Send a query or use FETCH.",
    r#"{"Status":"ok""#,
    r#"["ok"]"#,
    r#"{"Message":"no status"}"#,
    r#"{"Status":42}"#,
  ];
  for line in bad {
    match Response::parse(line) {
      Err(Error::Protocol(_)) => {}
      other => panic!("Expected Protocol error for {:?}, got: {:?}", line, other),
    }
  }
}

#[test]
fn test_error_display() {
  let err = Error::Connection("refused".to_string());
  assert_eq!(format!("{}", err), "Connection error: refused");

  let err = Error::Authentication("Invalid username or password".to_string());
  assert_eq!(format!("{}", err), "Authentication failed: Invalid username or password");

  let err = Error::Transport("broken pipe".to_string());
  assert_eq!(format!("{}", err), "Transport error: broken pipe");

  let err = Error::Protocol("bad json".to_string());
  assert_eq!(format!("{}", err), "Protocol error: bad json");

  assert_eq!(format!("{}", Error::ChannelClosed), "Channel closed");
  assert_eq!(format!("{}", Error::Closed), "Client closed");
  assert_eq!(format!("{}", Error::Timeout), "Timeout");
}

#[test]
fn test_error_from_io_and_json() {
  let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
  assert!(matches!(Error::from(io_err), Error::Io(_)));

  let json_err = serde_json::from_str::<Value>("invalid").unwrap_err();
  assert!(matches!(Error::from(json_err), Error::Serialization(_)));
}
