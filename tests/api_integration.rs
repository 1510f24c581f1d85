//! Purpose: End-to-end tests for the HTTP API served by `edgeframe serve`.
//! Exports: None (integration test module).
//! Role: Validate the greeting route and the JSON 404 envelope across TCP.
//! Invariants: Uses loopback-only servers on picked ports.
//! Invariants: Bounded waits avoid test flakiness; server processes are killed on drop.

use serde_json::Value;
use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::thread::sleep;
use std::time::{Duration, Instant};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

static SERVER_LOCK: Mutex<()> = Mutex::new(());

struct TestServer {
    child: Child,
    base_url: String,
    _server_guard: MutexGuard<'static, ()>,
}

impl TestServer {
    fn start() -> TestResult<Self> {
        Self::start_with_prefix(None)
    }

    fn start_with_prefix(prefix: Option<&str>) -> TestResult<Self> {
        let guard = SERVER_LOCK
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let ready_path = format!("{}/", prefix.unwrap_or("/api"));
        let mut last_err: Option<Box<dyn std::error::Error>> = None;
        for _attempt in 0..3 {
            let port = pick_port()?;
            let bind = format!("127.0.0.1:{port}");
            let base_url = format!("http://{bind}");

            let mut command = Command::new(env!("CARGO_BIN_EXE_edgeframe"));
            command
                .arg("serve")
                .arg("--bind")
                .arg(&bind)
                .env("RUST_LOG", "warn")
                .stdout(Stdio::null())
                .stderr(Stdio::piped());
            if let Some(prefix) = prefix {
                command.arg("--api-prefix").arg(prefix);
            }
            let mut child = command.spawn()?;

            match wait_for_server(&mut child, bind.parse()?, &ready_path) {
                Ok(()) => {
                    return Ok(Self {
                        child,
                        base_url,
                        _server_guard: guard,
                    });
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    last_err = Some(err);
                    sleep(Duration::from_millis(30));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| "server failed to start".into()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn api_root_returns_greeting() -> TestResult<()> {
    let server = TestServer::start()?;
    let response = ureq::get(&server.url("/api/")).call()?;
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type(), "application/json");
    let body = response.into_string()?;
    assert_eq!(body, r#"{"message":"Hello from API"}"#);
    Ok(())
}

#[test]
fn api_root_without_trailing_slash_returns_greeting() -> TestResult<()> {
    let server = TestServer::start()?;
    let response = ureq::get(&server.url("/api")).call()?;
    assert_eq!(response.status(), 200);
    assert_eq!(response.into_string()?, r#"{"message":"Hello from API"}"#);
    Ok(())
}

#[test]
fn unknown_path_is_json_not_found() -> TestResult<()> {
    let server = TestServer::start()?;
    match ureq::get(&server.url("/api/missing")).call() {
        Err(ureq::Error::Status(code, response)) => {
            assert_eq!(code, 404);
            let value: Value = serde_json::from_str(&response.into_string()?)?;
            assert_eq!(value["error"]["kind"], "NotFound");
            assert_eq!(value["error"]["message"], "no route for /api/missing");
        }
        other => panic!("expected 404, got {other:?}"),
    }
    Ok(())
}

#[test]
fn post_to_api_root_is_rejected() -> TestResult<()> {
    let server = TestServer::start()?;
    match ureq::post(&server.url("/api/")).call() {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 405),
        other => panic!("expected 405, got {other:?}"),
    }
    Ok(())
}

#[test]
fn custom_prefix_moves_the_route() -> TestResult<()> {
    let server = TestServer::start_with_prefix(Some("/v1/edge"))?;
    let response = ureq::get(&server.url("/v1/edge/")).call()?;
    assert_eq!(response.into_string()?, r#"{"message":"Hello from API"}"#);

    match ureq::get(&server.url("/api/")).call() {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 404),
        other => panic!("expected 404, got {other:?}"),
    }
    Ok(())
}

#[test]
fn serve_rejects_non_loopback_without_opt_in() -> TestResult<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_edgeframe"))
        .args(["serve", "--bind", "0.0.0.0:0"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    let text = String::from_utf8(output.stderr)?;
    let value: Value = serde_json::from_str(text.lines().next().ok_or("stderr line")?)?;
    assert_eq!(value["error"]["kind"], "Usage");
    Ok(())
}

fn pick_port() -> TestResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

fn wait_for_server(child: &mut Child, addr: SocketAddr, ready_path: &str) -> TestResult<()> {
    let url = format!("http://{addr}{ready_path}");
    let start = Instant::now();
    loop {
        if let Ok(resp) = ureq::get(&url).call() {
            if resp.status() == 200 {
                return Ok(());
            }
        }
        if let Some(status) = child.try_wait()? {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let detail = stderr.trim();
            return Err(format!(
                "server exited before ready (status: {status}, stderr: {})",
                if detail.is_empty() { "<empty>" } else { detail }
            )
            .into());
        }
        if start.elapsed() > Duration::from_secs(8) {
            return Err("server did not start in time".into());
        }
        sleep(Duration::from_millis(20));
    }
}
