use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

static DAEMON_BIN: OnceLock<PathBuf> = OnceLock::new();

struct DaemonGuard(Child);

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn daemon_bin() -> &'static PathBuf {
    DAEMON_BIN.get_or_init(|| {
        let root = workspace_root();
        let status = StdCommand::new("cargo")
            .arg("build")
            .arg("-p")
            .arg("flashcardd")
            .current_dir(&root)
            .status()
            .expect("cargo build should run");

        assert!(status.success(), "failed to build flashcardd binary");

        root.join("target/debug/flashcardd")
    })
}

fn flashctl() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("flashctl"))
}

fn allocate_addrs() -> (String, String) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    (format!("http://{addr}"), addr.to_string())
}

fn write_mock_config(dir: &Path, bind_addr: &str) -> PathBuf {
    let config_path = dir.join("flashcards.toml");
    let config = format!(
        r#"
[global]
instance_id = "cli-test"

[models.default]
provider = "mock"
model = "scripted"

[search]
provider = "disabled"

[server]
bind_addr = "{bind_addr}"
"#
    );
    std::fs::write(&config_path, config).expect("write config");
    config_path
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("output should be JSON")
}

fn start_daemon(config: &Path, addr: &str) -> DaemonGuard {
    let child = StdCommand::new(daemon_bin())
        .arg("--config")
        .arg(config)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn flashcardd");
    let guard = DaemonGuard(child);

    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        let healthy = flashctl()
            .args(["--addr", addr, "--timeout", "1s", "health"])
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if healthy {
            return guard;
        }
        assert!(Instant::now() < deadline, "flashcardd never became healthy");
        thread::sleep(Duration::from_millis(100));
    }
}

#[test]
fn unreachable_daemon_is_transport_error() {
    let (addr, _) = allocate_addrs();
    let assert = flashctl()
        .args(["--json", "--addr", &addr, "--timeout", "2s", "health"])
        .assert()
        .code(4);

    let json = parse_json_output(&assert.get_output().stderr);
    assert_eq!(json["ok"], Value::Bool(false));
    assert_eq!(json["error"]["code"], 4);
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("unable to reach flashcardd")
    );
}

#[test]
fn out_of_range_count_is_usage_error() {
    flashctl()
        .args(["generate", "Osmosis", "--count", "0"])
        .assert()
        .code(2);
    flashctl()
        .args(["generate", "Osmosis", "--count", "51"])
        .assert()
        .code(2);
}

#[test]
fn blank_topic_is_usage_error() {
    let (addr, _) = allocate_addrs();
    let assert = flashctl()
        .args(["--json", "--addr", &addr, "generate", "   "])
        .assert()
        .code(2);
    let json = parse_json_output(&assert.get_output().stderr);
    assert_eq!(json["error"]["message"], "topic must not be empty");
}

#[test]
fn generate_against_mock_daemon() {
    let temp = TempDir::new().expect("tempdir");
    let (addr, bind_addr) = allocate_addrs();
    let config = write_mock_config(temp.path(), &bind_addr);
    let _daemon = start_daemon(&config, &addr);

    let assert = flashctl()
        .args([
            "--json",
            "--addr",
            &addr,
            "generate",
            "Photosynthesis",
            "-n",
            "4",
            "--notes",
            "light reactions",
        ])
        .assert()
        .success();

    let json = parse_json_output(&assert.get_output().stdout);
    assert_eq!(json["ok"], Value::Bool(true));
    assert_eq!(json["result"]["topic"], "Photosynthesis");
    assert_eq!(json["result"]["cards"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        json["result"]["source_info"],
        "Generated based on web search results"
    );

    let human = flashctl()
        .args(["--addr", &addr, "generate", "Osmosis", "-n", "2"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&human.get_output().stdout).into_owned();
    assert!(stdout.starts_with("Osmosis (2 cards)"));
    assert!(stdout.contains("1. Q: "));
}
