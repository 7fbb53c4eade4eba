use grokken::batch::{self, BatchOptions};
use grokken::loader::MemoryLoader;
use grokken::registry::{DescriptorSource, Registry, TomlDirSource};
use std::fs;

fn fixture() -> (tempfile::TempDir, Registry, MemoryLoader) {
    let dir = tempfile::tempdir().unwrap();
    let defs = [
        ("a.toml", "identifier = \"A\"\ntitle = \"First\"\ntransforms = [\"normalize_whitespace\", \"trim\"]\n"),
        ("b.toml", "identifier = \"B\"\ntransforms = [\"trim\"]\n"),
        (
            "c.toml",
            "identifier = \"C\"\ntransforms = [{ name = \"reject_matching\", pattern = \"FORBIDDEN\" }]\n",
        ),
        ("d.toml", "identifier = \"D\"\ntransforms = [\"trim\"]\n"),
    ];
    for (name, body) in defs {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let source = TomlDirSource::new(dir.path());
    let reg = Registry::discover(&[&source as &dyn DescriptorSource]).unwrap();
    let loader: MemoryLoader = [
        ("A", "  Para   one.\n\nPara two.  "),
        ("C", "this text is FORBIDDEN"),
        ("D", "Fine."),
    ]
    .into_iter()
    .collect();
    (dir, reg, loader)
}

fn ids() -> Vec<String> {
    ["A", "B", "C", "GHOST", "D"].iter().map(|s| s.to_string()).collect()
}

#[test]
fn failures_do_not_stop_siblings() {
    let (_dir, reg, loader) = fixture();
    let report = batch::run(&reg, &ids(), &loader, &BatchOptions::default());

    let order: Vec<&str> = report.outcomes.iter().map(|o| o.identifier.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C", "GHOST", "D"]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 3);

    let kinds: Vec<Option<&str>> = report
        .outcomes
        .iter()
        .map(|o| o.error.as_ref().map(|e| e.kind.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![None, Some("load"), Some("transform_failure"), Some("not_found"), None]
    );
    assert_eq!(report.outcomes[0].stats.as_ref().unwrap().cleaned_chars, 20);
    assert!(report.failures().all(|o| o.stats.is_none()));
}

#[test]
fn parallel_run_matches_sequential() {
    let (_dir, reg, loader) = fixture();
    let sequential = batch::run(&reg, &ids(), &loader, &BatchOptions::default());
    let parallel = batch::run(
        &reg,
        &ids(),
        &loader,
        &BatchOptions {
            max_parallel: 3,
            ..BatchOptions::default()
        },
    );
    assert_eq!(sequential.run_id, parallel.run_id);
    let summarize = |r: &grokken::report::BatchReport| -> Vec<(String, bool)> {
        r.outcomes.iter().map(|o| (o.identifier.clone(), o.ok)).collect()
    };
    assert_eq!(summarize(&sequential), summarize(&parallel));
}

#[test]
fn writes_outputs_and_chunks() {
    let (_dir, reg, loader) = fixture();
    let out = tempfile::tempdir().unwrap();
    let mut opts = BatchOptions {
        chunk_max_chars: Some(10),
        out_dir: Some(out.path().to_path_buf()),
        ..BatchOptions::default()
    };
    opts.output.write_chunks_jsonl = true;

    let report = batch::run(&reg, &["A".to_string()], &loader, &opts);
    assert_eq!(report.outcomes[0].chunk_count, Some(2));

    let doc_dir = out.path().join("A");
    assert_eq!(fs::read_to_string(doc_dir.join("cleaned.txt")).unwrap(), "Para one.\n\nPara two.");
    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(doc_dir.join("stats.json")).unwrap()).unwrap();
    assert_eq!(stats["identifier"], "A");

    let chunks = fs::read_to_string(doc_dir.join("chunks.jsonl")).unwrap();
    let records: Vec<serde_json::Value> = chunks
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["text"], "Para two.");
    assert_eq!(records[1]["source"]["chunk_index"], 1);
    assert_eq!(records[1]["source"]["title"], "First");
}

#[test]
fn run_id_depends_on_config_and_request() {
    let (_dir, reg, loader) = fixture();
    let base = batch::run(&reg, &ids(), &loader, &BatchOptions::default());
    let other_cfg = batch::run(
        &reg,
        &ids(),
        &loader,
        &BatchOptions {
            config_norm: "[chunking]\nmax_chars = 1\n".into(),
            ..BatchOptions::default()
        },
    );
    let fewer = batch::run(&reg, &ids()[..2], &loader, &BatchOptions::default());
    assert_ne!(base.run_id, other_cfg.run_id);
    assert_ne!(base.run_id, fewer.run_id);
}
