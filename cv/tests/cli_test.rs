//! CLI tests for the `cv` binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn abc_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("0"), [b'A'; 64]).unwrap();
    fs::write(temp.path().join("40"), [b'B'; 64]).unwrap();
    fs::write(temp.path().join("80"), [b'C'; 32]).unwrap();
    temp
}

fn cv(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cv").unwrap();
    cmd.env("NO_COLOR", "1").arg("--path").arg(temp.path());
    cmd
}

#[test]
fn test_size_default() {
    let temp = abc_dir();
    cv(&temp)
        .arg("size")
        .assert()
        .success()
        .stdout(predicate::str::contains("17592186044416 bytes (default)"));
}

#[test]
fn test_size_from_metadata() {
    let temp = abc_dir();
    fs::write(temp.path().join("torrent.info"), "block_size: 512\nblocks_total: 4\n").unwrap();

    cv(&temp)
        .arg("size")
        .assert()
        .success()
        .stdout(predicate::str::contains("2048 bytes (torrent.info)"));
}

#[test]
fn test_chunks_listing() {
    let temp = abc_dir();
    cv(&temp)
        .arg("chunks")
        .assert()
        .success()
        .stdout(predicate::str::contains("0x40"))
        .stdout(predicate::str::contains("complete"))
        .stdout(predicate::str::contains("tail"))
        .stdout(predicate::str::contains("Chunks: 3"))
        .stdout(predicate::str::contains("Bytes present: 160"));
}

#[test]
fn test_read_raw_across_boundary() {
    let temp = abc_dir();
    let output = cv(&temp).args(["read", "60", "16"]).assert().success();

    let mut expected = b"AAAA".to_vec();
    expected.extend([b'B'; 12]);
    assert_eq!(output.get_output().stdout, expected);
}

#[test]
fn test_read_hex_dump() {
    let temp = abc_dir();
    cv(&temp)
        .args(["read", "0x80", "4", "--hex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0000000000000080  43 43 43 43"))
        .stdout(predicate::str::contains("|CCCC|"));
}

#[test]
fn test_read_short_reports_on_stderr() {
    let temp = abc_dir();
    let output = cv(&temp)
        .args(["read", "150", "20"])
        .assert()
        .success()
        .stderr(predicate::str::contains("short read: 10 of 20 bytes"));
    assert_eq!(output.get_output().stdout, vec![b'C'; 10]);
}

#[test]
fn test_read_at_end_of_address_space() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("ffffffffffffffff"), [9u8; 2]).unwrap();

    let output = cv(&temp)
        .args(["read", "0xffffffffffffffff", "4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("short read: 1 of 4 bytes"));
    assert_eq!(output.get_output().stdout, vec![9u8]);
}

#[test]
fn test_read_to_output_file() {
    let temp = abc_dir();
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("range.bin");

    cv(&temp)
        .args(["read", "0", "128", "--output"])
        .arg(&out)
        .assert()
        .success();

    let data = fs::read(&out).unwrap();
    assert_eq!(data.len(), 128);
    assert_eq!(&data[63..65], b"AB");
}

#[test]
fn test_read_hole_fails() {
    let temp = abc_dir();
    cv(&temp)
        .args(["read", "160", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data at offset 0xa0"));
}

#[test]
fn test_missing_path_fails() {
    let temp = TempDir::new().unwrap();
    Command::cargo_bin("cv")
        .unwrap()
        .current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("size")
        .assert()
        .failure()
        .stderr(predicate::str::contains("path parameter is required"));
}

#[test]
fn test_config_file_params() {
    let temp = abc_dir();
    let conf_dir = TempDir::new().unwrap();
    let conf = conf_dir.path().join("cv.yml");
    fs::write(&conf, format!("params:\n  path: {}\n", temp.path().display())).unwrap();

    Command::cargo_bin("cv")
        .unwrap()
        .arg("--config")
        .arg(&conf)
        .arg("chunks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunks: 3"));
}

#[test]
fn test_config_file_unknown_param_fails() {
    let temp = abc_dir();
    let conf_dir = TempDir::new().unwrap();
    let conf = conf_dir.path().join("cv.yml");
    fs::write(&conf, "params:\n  size: '1024'\n").unwrap();

    cv(&temp)
        .arg("--config")
        .arg(&conf)
        .arg("size")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown parameter: size"));
}

#[test]
fn test_invalid_chunk_name_fails() {
    let temp = abc_dir();
    fs::write(temp.path().join("partial.tmp"), "x").unwrap();

    cv(&temp)
        .arg("chunks")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid chunk name 'partial.tmp'"));
}
