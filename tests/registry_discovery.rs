use grokken::books::BuiltinCatalog;
use grokken::registry::{DescriptorSource, Registry, TomlDirSource, DEFAULT_COLLECTION};
use grokken::Error;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

const ESSAYS: &str = r#"
barcode = "ESSAYS01"
title = "Essays"
author = "Anon."
transforms = ["normalize_whitespace", { name = "collapse_blank_lines", max_consecutive = 1 }, "trim"]
"#;

#[test]
fn builtin_catalog_lists_principia() {
    let reg = Registry::builtin().unwrap();
    let members = reg.resolve_collection("principia").unwrap();
    assert_eq!(members.len(), 4);
    assert!(reg.list_identifiers().contains(&"32044072043805"));
    let federalist = reg.resolve("32044072043805").unwrap();
    assert_eq!(federalist.pipeline.finish().name(), Some("federalist_cleanup"));
}

#[test]
fn subdirectories_become_collections() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "essays/essays01.toml", ESSAYS);
    write(
        dir.path(),
        "loose.toml",
        "identifier = \"LOOSE\"\ntransforms = [\"trim\"]\n",
    );
    fs::create_dir_all(dir.path().join("pending")).unwrap();

    let source = TomlDirSource::new(dir.path());
    let reg = Registry::discover(&[&source as &dyn DescriptorSource]).unwrap();

    assert_eq!(reg.len(), 2);
    assert_eq!(reg.resolve("ESSAYS01").unwrap().collection, "essays");
    assert_eq!(reg.resolve("LOOSE").unwrap().collection, DEFAULT_COLLECTION);
    assert_eq!(
        reg.resolve("ESSAYS01").unwrap().pipeline.step_names(),
        vec!["normalize_whitespace", "collapse_blank_lines", "trim"]
    );
    // Recognized but empty.
    assert!(reg.resolve_collection("pending").unwrap().is_empty());
    assert!(matches!(
        reg.resolve_collection("nonexistent_tag"),
        Err(Error::NotFound { kind: "collection", .. })
    ));
    assert!(matches!(reg.resolve("NOPE"), Err(Error::NotFound { kind: "identifier", .. })));
}

#[test]
fn duplicate_identifier_names_both_definitions() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "extra/federalist.toml",
        "barcode = \"32044072043805\"\ntransforms = [\"trim\"]\n",
    );
    let source = TomlDirSource::new(dir.path());
    let err = Registry::discover(&[&BuiltinCatalog, &source]).unwrap_err();
    let Error::Config(msg) = err else {
        panic!("expected a config error, got {err:?}");
    };
    assert!(msg.contains("32044072043805"));
    assert!(msg.contains("builtin:principia/32044072043805"));
    assert!(msg.contains("federalist.toml"));
}

#[test]
fn handler_may_reference_a_catalog_finisher() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "reprint.toml",
        "identifier = \"REPRINT\"\ntransforms = [\"trim\"]\nfinish = \"federalist_cleanup\"\n",
    );
    let source = TomlDirSource::new(dir.path());
    let reg = Registry::discover(&[&source as &dyn DescriptorSource]).unwrap();
    assert_eq!(
        reg.resolve("REPRINT").unwrap().pipeline.step_names(),
        vec!["trim", "federalist_cleanup"]
    );
}

#[test]
fn invalid_definitions_fail_discovery() {
    let cases = [
        "identifier = \"A\"\ntransforms = [\"no_such_rule\"]\n",
        "identifier = \"A\"\n",
        "identifier = \"A\"\ntransforms = [\"trim\"]\nfinish = \"nobody_cleanup\"\n",
        "identifier = \"A\"\ntransforms = [\"trim\"]\ncolour = \"red\"\n",
        "transforms = [\"trim\"]\n",
        "identifier = \"A\"\ntransforms = [\"trim\", \"trim\"]\n",
    ];
    for body in cases {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.toml", body);
        let source = TomlDirSource::new(dir.path());
        let err = Registry::discover(&[&source as &dyn DescriptorSource]).unwrap_err();
        assert_eq!(err.kind(), "config", "{body}");
    }
}

#[test]
fn missing_handlers_dir_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = TomlDirSource::new(dir.path().join("absent"));
    let err = Registry::discover(&[&source as &dyn DescriptorSource]).unwrap_err();
    assert_eq!(err.kind(), "config");
}
