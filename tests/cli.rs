use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn cli(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dart-devtools").unwrap();
    cmd.arg("--root").arg(root).env("RUST_LOG", "off");
    cmd
}

fn l10n_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "lib/l10n/app_en.arb", "{\n  \"@@locale\": \"en\",\n  \"hello\": \"Hello\"\n}\n");
    write(root, "lib/l10n/app_de.arb", "{\n  \"@@locale\": \"de\"\n}\n");
    write(root, "glossary.json", r#"{"de": {"Hello": "Hallo", "Goodbye": "Tschüss"}}"#);
    write(root, ".dart-devtools.json", r#"{"glossaryFile": "glossary.json"}"#);
    dir
}

#[test]
fn json2dart_creates_class_in_file_without_outline() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/user.dart", "");
    cli(dir.path())
        .args(["json2dart", "-f", "lib/user.dart", "-l", "0", "--class-name", "User"])
        .args(["--json", r#"{"id": 1, "name": "Ada"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied"));
    let text = fs::read_to_string(dir.path().join("lib/user.dart")).unwrap();
    assert!(text.contains("class User"));
    assert!(text.contains("part 'user.g.dart';"));
    assert!(text.contains("fromJson"));
}

#[test]
fn invalid_class_name_is_a_warning() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/user.dart", "");
    cli(dir.path())
        .args(["json2dart", "-f", "lib/user.dart", "-l", "0", "--class-name", "user"])
        .args(["--json", r#"{"id": 1}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning:").and(predicate::str::contains("invalid class name")));
    assert_eq!(fs::read_to_string(dir.path().join("lib/user.dart")).unwrap(), "");
}

#[test]
fn translate_arb_fills_missing_entries() {
    let dir = l10n_project();
    cli(dir.path())
        .args(["translate-arb", "-f", "lib/l10n/app_de.arb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));
    let de = fs::read_to_string(dir.path().join("lib/l10n/app_de.arb")).unwrap();
    assert!(de.contains("\"hello\": \"Hallo\""));
}

#[test]
fn translate_arb_rejects_other_files() {
    let dir = l10n_project();
    write(dir.path(), "lib/l10n/notes.txt", "");
    cli(dir.path())
        .args(["translate-arb", "-f", "lib/l10n/notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not an .arb file"));
}

#[test]
fn extract_l10n_replaces_literal_and_translates() {
    let dir = l10n_project();
    write(dir.path(), "lib/main.dart", "final w = Text('Goodbye');\n");
    cli(dir.path())
        .args(["extract-l10n", "-f", "lib/main.dart", "-l", "0", "-c", "17", "--key", "goodbye"])
        .assert()
        .success()
        .stdout(predicate::str::contains("goodbye"));
    let main = fs::read_to_string(dir.path().join("lib/main.dart")).unwrap();
    assert_eq!(main, "final w = Text(S.current.goodbye);\n");
    let en = fs::read_to_string(dir.path().join("lib/l10n/app_en.arb")).unwrap();
    let de = fs::read_to_string(dir.path().join("lib/l10n/app_de.arb")).unwrap();
    assert!(en.contains("\"goodbye\": \"Goodbye\""));
    assert!(de.contains("\"goodbye\": \"Tschüss\""));
}

#[test]
fn l10n_definition_points_at_arb_entries() {
    let dir = l10n_project();
    write(dir.path(), "lib/main.dart", "final w = Text(S.current.hello);\n");
    cli(dir.path())
        .args(["l10n-definition", "-f", "lib/main.dart", "-l", "0", "-c", "27"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app_en.arb:3:"));
}

#[test]
fn tree_lists_visible_entries_as_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/main.dart", "");
    write(dir.path(), "pubspec.lock", "");
    fs::create_dir_all(dir.path().join("android")).unwrap();
    cli(dir.path())
        .args(["tree", "ls", "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"kind\": \"folder\"")
                .and(predicate::str::contains("android").not())
                .and(predicate::str::contains("pubspec.lock").not()),
        );
}

#[test]
fn tree_delete_needs_confirmation() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/main.dart", "");
    cli(dir.path()).args(["tree", "rm", "lib/main.dart"]).assert().failure();
    assert!(dir.path().join("lib/main.dart").exists());
    cli(dir.path()).args(["tree", "rm", "lib/main.dart", "--yes"]).assert().success();
    assert!(!dir.path().join("lib/main.dart").exists());
}

#[test]
fn tool_commands_are_printed() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["tool", "build-runner", "--file", "lib/models/user.dart"])
        .assert()
        .success()
        .stdout("flutter pub run build_runner build --build-filter='lib/models/user*.dart'\n");
    cli(dir.path()).args(["tool", "gen-l10n"]).assert().success().stdout("flutter gen-l10n\n");
}

#[test]
fn classes_prints_or_writes_dart_source() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "sample.json", r#"{"id": 7, "owner": {"name": "Ada"}}"#);
    cli(dir.path())
        .args(["classes", "--json-file", "sample.json", "--class-name", "Repo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("class Repo {").and(predicate::str::contains("class Owner {")));
    cli(dir.path())
        .args(["classes", "--json", "[]", "--out", "out/empty.dart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("json content is empty"));
    cli(dir.path())
        .args(["classes", "--json", r#"{"ok": true}"#, "--out", "out/flag.dart"])
        .assert()
        .success();
    let text = fs::read_to_string(dir.path().join("out/flag.dart")).unwrap();
    assert!(text.contains("bool? ok;"));
}
