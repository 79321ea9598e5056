use std::process::{Command, Output};

const ENV_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "OPENAI_API_KEY",
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "PR_NUMBER",
    "GITHUB_EVENT_PATH",
    "GITHUB_API_URL",
    "RUST_LOG",
];

fn critic(dir: &std::path::Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_critic"));
    cmd.args(args).current_dir(dir);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

const FULL_ENV: &[(&str, &str)] = &[
    ("GEMINI_API_KEY", "gm-key"),
    ("GITHUB_TOKEN", "ghs_test"),
    ("GITHUB_REPOSITORY", "octocat/hello-world"),
    ("PR_NUMBER", "7"),
];

#[test]
fn missing_api_key_aborts_before_any_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.py"), "print('hello world')\n".repeat(10)).unwrap();

    let output = critic(dir.path(), &["a.py"], &[("GITHUB_TOKEN", "t")]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GEMINI_API_KEY"), "stderr: {stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Review complete"));
}

#[test]
fn malformed_repository_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let env = [
        ("GEMINI_API_KEY", "gm-key"),
        ("GITHUB_TOKEN", "ghs_test"),
        ("GITHUB_REPOSITORY", "hello-world"),
    ];

    let output = critic(dir.path(), &["a.py"], &env);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("owner/repo"));
}

#[test]
fn no_reviewable_files_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();

    let output = critic(dir.path(), &["README.md docs/notes.txt"], FULL_ENV);

    assert!(
        output.status.success(),
        "critic failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No reviewable files among 2 changed file(s)."));
}

#[test]
fn skipped_file_is_reported_as_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tiny.py"), "x = 1\n").unwrap();

    let output = critic(dir.path(), &["--format", "json", "tiny.py"], FULL_ENV);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files"][0]["path"], "tiny.py");
    assert_eq!(report["files"][0]["status"], "skipped");
    assert_eq!(report["stats"]["attempted"], 0);
}

#[test]
fn config_file_and_extension_flag_are_honoured() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".critic.toml"),
        "[review]\nextensions = [\".rs\"]\n",
    )
    .unwrap();

    let from_file = critic(dir.path(), &["lib.rs main.py"], FULL_ENV);
    let stdout = String::from_utf8_lossy(&from_file.stdout);
    assert!(stdout.contains("lib.rs: read failed"), "stdout: {stdout}");
    assert!(!stdout.contains("main.py"));

    let from_flag = critic(dir.path(), &["--extensions", ".md", "lib.rs main.py"], FULL_ENV);
    let stdout = String::from_utf8_lossy(&from_flag.stdout);
    assert!(stdout.contains("No reviewable files among 2 changed file(s)."));
}
