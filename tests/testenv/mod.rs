use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::{self, Stdio},
};

use {serde_json::Value, tempfile::TempDir};

// Environment for the integration tests.
pub struct TestEnv {
    // Temporary directory holding the dataset, used as HOME as well.
    pub temp_dir: TempDir,
    // Path to the dataset file passed with `--file`.
    data_file: PathBuf,
}

impl TestEnv {
    pub fn new(rows: &[Vec<Value>]) -> TestEnv {
        let temp_dir = tempfile::tempdir().expect("working directory");
        let data_file = temp_dir.path().join("catalog.json");
        let data = serde_json::to_string(rows).expect("rows serialize");
        fs::write(&data_file, data).expect("dataset written");

        TestEnv {
            temp_dir,
            data_file,
        }
    }

    // Writes a `repertoire.yml` where the config file search finds it.
    pub fn with_config(self, contents: &str) -> TestEnv {
        let dir = self.temp_dir.path().join(".config").join("repertoire");
        fs::create_dir_all(&dir).expect("config directory");
        fs::write(dir.join("repertoire.yml"), contents).expect("config written");
        self
    }

    // Asserts that running with the dataset and `args` succeeds with
    // `expected` in stdout.
    pub fn assert_output(&self, args: &[&str], expected: &[&str]) -> String {
        let output = self.run(args, None);
        let stdout = utf8(&output.stdout);

        assert!(
            output.status.success(),
            "\n\
            ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~\n\
            repertoire failed with:\n\
            {}\n\
            ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~\n",
            utf8(&output.stderr)
        );

        assert_contains("output", &stdout, expected);
        stdout
    }

    // Like `assert_output`, feeding `input` to the interactive prompt.
    pub fn assert_session(&self, input: &str, expected: &[&str]) -> String {
        let output = self.run(&["-i"], Some(input));
        let stdout = utf8(&output.stdout);

        assert!(output.status.success(), "{}", utf8(&output.stderr));
        assert_contains("session", &stdout, expected);
        stdout
    }

    // Assert that calling repertoire with the specified arguments produces
    // the expected error.
    pub fn assert_error_msg(&self, args: &[&str], expected: &str) {
        let output = self.run(args, None);
        let stderr = utf8(&output.stderr);

        assert!(!output.status.success(), "expected a failure, got success");
        assert_contains("error message", &stderr, &[expected]);
    }

    fn run(&self, args: &[&str], input: Option<&str>) -> process::Output {
        let mut cmd = process::Command::new(env!("CARGO_BIN_EXE_repertoire"));
        cmd.current_dir(self.temp_dir.path())
            .env("HOME", self.temp_dir.path())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("REPERTOIRE_LOG")
            .arg("--file")
            .arg(&self.data_file)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().expect("repertoire runs");

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.unwrap_or_default().as_bytes())
                .expect("input written");
        }

        child.wait_with_output().expect("repertoire output")
    }
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("output should be utf8")
}

fn assert_contains(what: &str, text: &str, expected: &[&str]) {
    for needle in expected {
        assert!(
            text.contains(needle),
            "\n\
            ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~\n\
            The {}:\n\
            {}\n\
            does not contain the expected text:\n\
            {:?}\n\
            ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~\n",
            what,
            text,
            needle
        );
    }
}
