//! End-to-End Integration Tests for the regru CLI
//!
//! These tests run the compiled `regru` binary against an in-process mock of
//! the REG.RU API2, with the config directory pointed at a temp dir.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Form, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::{Output, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::process::Command;
use tokio::time::timeout;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

const USERNAME: &str = "e2e-user";
const PASSWORD: &str = "e2e-pass";

type Calls = Arc<Mutex<Vec<String>>>;

async fn mock_api(State(calls): State<Calls>, Path(method): Path<String>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let method = method.trim_start_matches('/').to_string();
    calls.lock().unwrap().push(method.clone());

    let authed = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    if !authed {
        return Json(json!({
            "result": "error",
            "error_code": "PASSWORD_AUTH_FAILED",
            "error_text": "Username/password Incorrect"
        }));
    }

    match method.as_str() {
        "nop" => Json(json!({"result": "success", "answer": {"login": USERNAME, "user_id": 7}})),
        "service/get_list" => Json(json!({
            "result": "success",
            "answer": {"services": [
                {"service_id": 11, "dname": "alpha.ru", "servtype": "domain", "state": "A", "expiration_date": "2027-01-01"},
                {"service_id": 12, "dname": "beta.ru", "servtype": "domain", "state": "N", "expiration_date": "2026-12-01"}
            ]}
        })),
        _ => Json(json!({"result": "error", "error_code": "NO_SUCH_COMMAND", "error_text": "No such command"})),
    }
}

/// Test harness: temp config dir plus a running mock API
struct E2ETestHarness {
    config_home: TempDir,
    endpoint: String,
    calls: Calls,
}

impl E2ETestHarness {
    async fn start() -> Result<Self> {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/api/regru2/*method", post(mock_api))
            .with_state(calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}/api/regru2", listener.local_addr()?);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        Ok(Self {
            config_home: tempfile::tempdir()?,
            endpoint,
            calls,
        })
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_regru"));
        cmd.args(args)
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for key in [
            "REGRU_ENDPOINT",
            "REGRU_REGION",
            "REGRU_TIMEOUT",
            "REGRU_RETRIES",
            "REGRU_USERNAME",
            "REGRU_PASSWORD",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    /// Run with an empty stdin
    async fn run(&self, args: &[&str]) -> Result<Output> {
        self.run_with_stdin(args, "").await
    }

    async fn run_with_stdin(&self, args: &[&str], input: &str) -> Result<Output> {
        let mut child = self.command(args).stdin(Stdio::piped()).spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // The CLI may exit before reading stdin
            let _ = stdin.write_all(input.as_bytes()).await;
        }
        Ok(timeout(COMMAND_TIMEOUT, child.wait_with_output()).await??)
    }

    /// Run against the mock API with valid credentials in the environment
    async fn run_api(&self, args: &[&str], password: &str) -> Result<Output> {
        let mut cmd = self.command(args);
        cmd.env("REGRU_ENDPOINT", &self.endpoint)
            .env("REGRU_USERNAME", USERNAME)
            .env("REGRU_PASSWORD", password)
            .stdin(Stdio::null());
        Ok(timeout(COMMAND_TIMEOUT, cmd.output()).await??)
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[tokio::test]
async fn test_config_path_uses_xdg_home() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run(&["cfg", "path"]).await?;

    assert!(output.status.success());
    let expected = harness.config_home.path().join("regru").join("config.json");
    assert_eq!(stdout(&output).trim(), expected.to_string_lossy());
    Ok(())
}

#[tokio::test]
async fn test_config_set_and_get_plain() -> Result<()> {
    let harness = E2ETestHarness::start().await?;

    let output = harness.run(&["cfg", "set", "retries=3", "region=ru"]).await?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = harness.run(&["cfg", "get", "retries", "region", "--plain"]).await?;
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "region\tru\nretries\t3");
    Ok(())
}

#[tokio::test]
async fn test_secret_via_argv_exits_2() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run(&["cfg", "set", "password=hunter2"]).await?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Refusing to set secret key 'password'"));
    assert!(!harness.config_home.path().join("regru").join("config.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_piped_password_is_redacted() -> Result<()> {
    let harness = E2ETestHarness::start().await?;

    let output = harness
        .run_with_stdin(&["cfg", "set", "password", "-"], "s3cret\n")
        .await?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = harness.run(&["cfg", "list", "--json"]).await?;
    let listed: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(listed["password"], "********");
    assert!(!stdout(&output).contains("s3cret"));

    let output = harness.run(&["cfg", "get", "password", "--reveal", "--json"]).await?;
    let revealed: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(revealed["password"], "s3cret");
    Ok(())
}

#[tokio::test]
async fn test_unknown_config_key_exits_2() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run(&["cfg", "set", "color=red"]).await?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unsupported config key: color"));
    Ok(())
}

#[tokio::test]
async fn test_import_requires_json_flag() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness
        .run_with_stdin(&["cfg", "import"], r#"{"retries": 2}"#)
        .await?;

    assert_eq!(output.status.code(), Some(2));

    let output = harness
        .run_with_stdin(&["cfg", "import", "--json"], r#"{"retries": "2"}"#)
        .await?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(body["ok"], true);

    let output = harness.run(&["cfg", "export", "--json"]).await?;
    let exported: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(exported["retries"], 2);
    Ok(())
}

#[tokio::test]
async fn test_reseller_method_blocked_without_request() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness
        .run_api(&["do", "reseller/get_balance", "--json"], PASSWORD)
        .await?;

    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(envelope["error"]["exitCode"], 2);
    assert_eq!(harness.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_domains_list_plain() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run_api(&["domains", "list", "--plain"], PASSWORD).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "alpha.ru\t2027-01-01\t11\tA\nbeta.ru\t2026-12-01\t12\tN"
    );
    Ok(())
}

#[tokio::test]
async fn test_api_error_envelope() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run_api(&["nop", "--json"], "wrong").await?;

    assert_eq!(output.status.code(), Some(1));
    let envelope: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(
        envelope["error"]["message"],
        "PASSWORD_AUTH_FAILED: Username/password Incorrect"
    );
    assert_eq!(envelope["error"]["details"]["error_code"], "PASSWORD_AUTH_FAILED");
    // API errors are not retried
    assert_eq!(harness.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_credentials_exit_2() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness
        .run(&["nop", "--endpoint", &harness.endpoint])
        .await?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Username/password are missing"));
    assert_eq!(harness.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_wait_and_bad_flags_exit_2() -> Result<()> {
    let harness = E2ETestHarness::start().await?;

    let output = harness.run(&["wait", "123"]).await?;
    assert_eq!(output.status.code(), Some(2));
    // The bare message, same as in plain mode
    assert_eq!(
        stderr(&output).trim_end(),
        "wait is not supported: REG.RU API2 commands used by regru-cli are synchronous."
    );
    let plain = harness.run(&["wait", "123", "--plain"]).await?;
    assert_eq!(stderr(&plain), stderr(&output));

    let output = harness.run(&["nop", "--timeout", "0"]).await?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_skill_prints_url() -> Result<()> {
    let harness = E2ETestHarness::start().await?;
    let output = harness.run(&["skill"]).await?;

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        "https://github.com/vforsh/regru-cli/tree/main/skill/regru"
    );
    Ok(())
}
