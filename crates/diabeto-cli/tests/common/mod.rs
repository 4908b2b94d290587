#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

pub const EMAIL: &str = "asha@example.com";
pub const PASSWORD: &str = "secret1";

/// An isolated HOME, data dir, config dir and file backend store.
pub struct TestEnv {
    dir: TempDir,
    config: Value,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = json!({
            "backend": {
                "kind": "file",
                "root": dir.path().join("store"),
                "hashCost": 4
            },
            "trackVisits": false
        });
        let env = Self { dir, config };
        env.write_config();
        env
    }

    /// Point inference at a mock server with a key.
    pub fn with_inference(mut self, endpoint: &str) -> Self {
        self.config["inference"] = json!({ "endpoint": endpoint, "apiKey": "sk-test" });
        self.write_config();
        self
    }

    /// Merge extra top-level settings into the config.
    pub fn configure(mut self, key: &str, value: Value) -> Self {
        self.config[key] = value;
        self.write_config();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    fn write_config(&self) {
        fs::write(self.config_path(), serde_json::to_string_pretty(&self.config).unwrap()).unwrap();
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_diabeto"));
        cmd.args(args);
        cmd.env("HOME", self.path().join("home"));
        cmd.env("XDG_DATA_HOME", self.path().join("data"));
        cmd.env("XDG_CONFIG_HOME", self.path().join("config"));
        cmd.env("DIABETO_CONFIG", self.config_path());
        cmd.env_remove("DIABETO_INFERENCE_KEY");
        cmd.env_remove("DIABETO_PASSWORD");
        cmd.env_remove("RUST_LOG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Run the CLI.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute CLI")
    }

    /// Run the CLI with `input` on stdin.
    pub fn run_with_stdin(&self, args: &[&str], input: &[u8]) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute CLI");
        child.stdin.take().unwrap().write_all(input).unwrap();
        child.wait_with_output().unwrap()
    }

    /// Run the CLI and expect success, returning stdout.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "CLI command failed: {:?}\nstderr: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure, returning stderr.
    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "CLI command unexpectedly succeeded: {:?}\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn register(&self) {
        self.run_success(&[
            "auth", "register", "--name", "Asha", "--email", EMAIL, "--password", PASSWORD,
        ]);
    }

    /// A small stand-in JPEG.
    pub fn image(&self) -> PathBuf {
        let path = self.path().join("meal.jpg");
        fs::write(&path, b"\xff\xd8\xff\xe0fake-jpeg").unwrap();
        path
    }

    /// `history list --json`, one value per record.
    pub fn history(&self) -> Vec<Value> {
        self.run_success(&["history", "list", "--json"])
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}
