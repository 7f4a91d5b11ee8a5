use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    image::DynamicImage::new_rgba8(width, height).save(path).unwrap();
}

/// Command isolated from any config file or environment of the host.
fn intake(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("image-intake").unwrap();
    cmd.current_dir(workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path().join("xdg"))
        .env_remove("IMAGE_INTAKE_UPLOAD_URL")
        .env_remove("IMAGE_INTAKE_UPLOAD_TOKEN")
        .env_remove("IMAGE_INTAKE_OUTPUT_DIR")
        .env_remove("IMAGE_INTAKE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_accepted_extensions() {
    let dir = TempDir::new().unwrap();
    intake(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(".jpg, .jpeg, .png, .bmp, .webp"));
}

#[test]
fn test_classify_json() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("photo.png"), 4, 4);
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let output = intake(&dir)
        .args(["classify", "photo.png", "notes.txt", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["name"], "photo.png");
    assert_eq!(rows[0]["accepted"], true);
    assert_eq!(rows[0]["probe_eligible"], false);
    assert_eq!(rows[0]["sniffed_type"], "image/png");
    assert_eq!(rows[1]["accepted"], false);
    assert_eq!(rows[1]["content_type"], "");
}

#[test]
fn test_classify_reports_rejected_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    intake(&dir)
        .args(["classify", "notes.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File name notes.txt: Not a webp file type."));
}

#[test]
fn test_probe_all_reports_dimensions() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("wide.png"), 30, 20);

    intake(&dir)
        .args(["probe", "wide.png", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wide.png: 30px X 20px"));
}

#[test]
fn test_reencode_saves_jpeg() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("cat.png"), 16, 16);

    intake(&dir)
        .args(["reencode", "cat.png", "--out-dir", "out"])
        .assert()
        .success();

    let saved = std::fs::read(dir.path().join("out").join("cat.jpeg")).unwrap();
    assert_eq!(&saved[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_process_without_upload() {
    let dir = TempDir::new().unwrap();
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    write_png(&photos.join("a.png"), 8, 8);
    write_png(&photos.join("b.png"), 12, 6);
    std::fs::write(photos.join("readme.md"), b"ignored").unwrap();

    let output = intake(&dir)
        .args(["process", "photos", "--no-upload", "--out-dir", "out", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = json["report"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["outcome"]["outcome"], "encoded");
    assert_eq!(files[0]["outcome"]["upload"]["result"], "skipped");
    assert_eq!(json["metrics"]["counters"]["reencode.attempts"], 2);

    assert!(dir.path().join("out").join("a.jpeg").exists());
    assert!(dir.path().join("out").join("b.jpeg").exists());
}

#[test]
fn test_process_empty_selection() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("empty")).unwrap();
    std::fs::write(dir.path().join("empty").join("notes.txt"), b"no images here").unwrap();

    intake(&dir)
        .args(["process", "empty", "--no-upload"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files currently selected for upload"))
        .stdout(predicate::str::contains("Batch").not());
}

#[test]
fn test_missing_input_path_exits_one() {
    let dir = TempDir::new().unwrap();

    intake(&dir)
        .args(["classify", "nowhere.png"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nowhere.png"));
}

#[test]
fn test_tiny_quality_step_exits_three() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("cat.png"), 4, 4);
    std::fs::write(dir.path().join("fine.toml"), "[reencode]\nquality_step = 1e-12\n").unwrap();

    intake(&dir)
        .args(["--config", "fine.toml", "reencode", "cat.png"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("quality_step"));
}

#[test]
fn test_process_decode_failure_exits_one() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not really a png").unwrap();

    intake(&dir)
        .args(["process", "broken.png", "--no-upload"])
        .assert()
        .code(1);
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("cat.png"), 16, 16);
    std::fs::write(
        dir.path().join(".image-intake.toml"),
        "[output]\ndir = \"from-config\"\n\n[upload]\nenabled = false\n",
    )
    .unwrap();

    intake(&dir).args(["process", "cat.png"]).assert().success();
    assert!(dir.path().join("from-config").join("cat.jpeg").exists());
}

#[test]
fn test_missing_config_exits_three() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("cat.png"), 4, 4);

    intake(&dir)
        .args(["--config", "missing.toml", "classify", "cat.png"])
        .assert()
        .code(3);
}

#[test]
fn test_invalid_config_value_exits_three() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("cat.png"), 4, 4);
    std::fs::write(dir.path().join("bad.toml"), "[reencode]\nthreshold_bytes = 0\n").unwrap();

    intake(&dir)
        .args(["--config", "bad.toml", "classify", "cat.png"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("threshold_bytes"));
}
