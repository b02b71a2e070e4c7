use std::path::Path;
use std::process::Command;

const DOCUMENT: &str = r#"{
    "name": "lid.FCStd",
    "operations": [
        {
            "label": "Profile",
            "commands": [
                { "command": { "name": "M6", "params": { "T": 1 } } },
                { "command": { "name": "G0", "params": { "X": 1.0, "Y": 2.0, "Z": 3.0 } } }
            ]
        }
    ]
}"#;

fn write_inputs(dir: &Path) -> (String, String) {
    let doc = dir.join("lid.json");
    std::fs::write(&doc, DOCUMENT).unwrap();
    let config = dir.join("post.toml");
    std::fs::write(&config, "show_editor = false\nremote_post = false\n").unwrap();
    (
        doc.to_str().unwrap().to_string(),
        config.to_str().unwrap().to_string(),
    )
}

fn postkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_postkit"))
}

#[test]
fn test_program_written_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (doc, config) = write_inputs(dir.path());

    let output = postkit()
        .args([doc.as_str(), "--config", config.as_str(), "--args", "--no-header --no-comments"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("G17 G54 G40 G49 G80 G90\nM208\nG21\n"));
    assert!(text.contains("M6 T1 G43 H1\nG0 X1.000 Y2.000\nG0 Z3.000\n"));
    assert!(text.ends_with("M2\n"));
}

#[test]
fn test_program_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let (doc, config) = write_inputs(dir.path());
    let out = dir.path().join("lid.ngc");

    let output = postkit()
        .args([doc.as_str(), "--config", config.as_str(), "-o", out.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("(Exported by postkit)\n"));
}

#[test]
fn test_bad_post_arguments_fail() {
    let dir = tempfile::tempdir().unwrap();
    let (doc, config) = write_inputs(dir.path());
    let out = dir.path().join("lid.ngc");

    let output = postkit()
        .args([
            doc.as_str(),
            "--config",
            config.as_str(),
            "--args",
            "--precision lots",
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!out.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[test]
fn test_post_help_lists_flags() {
    let output = postkit().arg("--post-help").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--measure-tool"));
}
