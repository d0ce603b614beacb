//! CLI integration tests
//!
//! These tests run the built binary against catalogs written to temporary
//! directories.

#![cfg(feature = "cli")]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const CATALOG: &str = r#"{
    "models": [
        {
            "name": "Blog",
            "columns": [{"name": "title", "type": "string"}],
            "validators": {"title": [{"kind": "presence"}]},
            "associations": [
                {"name": "posts", "target": "Post", "cardinality": "many", "nested_attributes": true}
            ]
        },
        {
            "name": "Post",
            "columns": [
                {"name": "body", "type": "text"},
                {"name": "internal_notes", "type": "text"}
            ]
        },
        {
            "name": "Shop::Person",
            "columns": [{"name": "score", "type": "float"}]
        }
    ],
    "customizations": {
        "Post": {"ignore": ["internal_notes"]}
    }
}"#;

fn modelxsd_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_modelxsd"))
}

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(modelxsd_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_cli_generate_stdout() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "models.json", CATALOG);

    let output = run(&["generate", "-m", catalog.to_str().unwrap(), "--model", "Blog"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "generate should succeed");
    assert!(stdout.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(stdout.contains(r#"<xs:element name="blogs" type="Blogs"/>"#));
    assert!(stdout.contains(r#"<xs:complexType name="Post">"#));
    assert!(!stdout.contains("internal-notes"), "catalog customization should apply");

    roxmltree::Document::parse(&stdout).expect("output should be well-formed");
}

#[test]
fn test_cli_generate_to_file_with_options() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "models.json", CATALOG);
    let options = write_fixture(
        dir.path(),
        "options.json",
        r#"{"methods": {"display_name": null}, "optional": ["title"], "xml_declaration": false}"#,
    );
    let out = dir.path().join("blog.xsd");

    let output = run(&[
        "generate",
        "-m",
        catalog.to_str().unwrap(),
        "--model",
        "Blog",
        "--options",
        options.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "generate should succeed");
    assert!(output.stdout.is_empty(), "nothing should be printed when writing a file");

    let xsd = fs::read_to_string(&out).unwrap();
    assert!(xsd.starts_with("<xs:schema"));
    assert!(xsd.contains(r#"<xs:element name="display-name" minOccurs="0" maxOccurs="1"/>"#));
    assert!(xsd.contains(r#"<xs:element name="title" minOccurs="0" maxOccurs="1">"#));
}

#[test]
fn test_cli_generate_with_customization_file() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "models.json", CATALOG);
    let customization = write_fixture(
        dir.path(),
        "customization.json",
        r#"{"ignore": ["posts"], "elements": {"tags": ["tag"]}}"#,
    );

    let output = run(&[
        "generate",
        "-m",
        catalog.to_str().unwrap(),
        "--model",
        "Blog",
        "-c",
        customization.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "generate should succeed");
    assert!(!stdout.contains("posts-attributes"));
    assert!(!stdout.contains(r#"<xs:complexType name="Post">"#));
    assert!(stdout.contains(r#"name="tags""#));
}

#[test]
fn test_cli_generate_unknown_model() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "models.json", CATALOG);

    let output = run(&["generate", "-m", catalog.to_str().unwrap(), "--model", "Ghost"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "unknown model should fail");
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("Ghost"));
    assert!(output.stdout.is_empty(), "no partial document should be written");
}

#[test]
fn test_cli_generate_unknown_type() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(
        dir.path(),
        "models.json",
        r#"{"models": [{"name": "Token", "columns": [{"name": "value", "type": "uuid"}]}]}"#,
    );

    let output = run(&["generate", "-m", catalog.to_str().unwrap(), "--model", "Token"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("uuid"));
}

#[test]
fn test_cli_generate_missing_catalog() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");

    let output = run(&["generate", "-m", missing.to_str().unwrap(), "--model", "Blog"]);

    assert!(!output.status.success(), "missing catalog should fail");
}

// ============================================================================
// List Command Tests
// ============================================================================

#[test]
fn test_cli_list() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "models.json", CATALOG);

    let output = run(&["list", "-m", catalog.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "list should succeed");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Blog : Blog (blogs)",
            "Post : Post (posts)",
            "Shop::Person : Person (people)",
        ]
    );
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("list"));
}
