use assert_cmd::Command;
use boxaug::io_json::{read_document, AnnotationDocument};

mod common;

fn boxaug() -> Command {
    let mut cmd = Command::cargo_bin("boxaug").unwrap();
    cmd.env_remove("BOXAUG_SEED");
    cmd
}

fn stdout_document(cmd: &mut Command) -> AnnotationDocument {
    let output = cmd.assert().success().get_output().stdout.clone();
    boxaug::io_json::from_json_str(&String::from_utf8(output).unwrap()).unwrap()
}

#[test]
fn runs() {
    boxaug().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = boxaug();
    cmd.arg("-V");
    cmd.assert().success().stdout("boxaug 0.1.0\n");
}

// Augment subcommand tests

#[test]
fn augment_writes_document_with_trace() {
    let temp = tempfile::tempdir().unwrap();
    let output = temp.path().join("out.json");

    let mut cmd = boxaug();
    cmd.args([
        "augment",
        "tests/fixtures/sample.json",
        "--config",
        "tests/fixtures/crop.yaml",
        "--seed",
        "7",
        "--output",
    ]);
    cmd.arg(&output);
    cmd.assert().success();

    let doc = read_document(&output).unwrap();
    assert_eq!((doc.height, doc.width), (256, 256));
    let replay = doc.replay.expect("trace is recorded");
    assert_eq!(replay.len(), 2);
    assert_eq!(replay.entries[0].transform, "RandomCrop");
    assert!(replay.entries[0].applied);

    let boxes = doc.bboxes.expect("bboxes are written");
    assert_eq!(boxes.len(), doc.labels["labels"].len());
}

#[test]
fn augment_is_deterministic_for_a_seed() {
    let run = || {
        let mut cmd = boxaug();
        cmd.args([
            "augment",
            "tests/fixtures/sample.json",
            "-c",
            "tests/fixtures/crop.yaml",
            "--seed",
            "123",
        ]);
        stdout_document(&mut cmd)
    };
    assert_eq!(run(), run());
}

#[test]
fn augment_reads_seed_from_env() {
    let run = |seed: &str| {
        let mut cmd = boxaug();
        cmd.env("BOXAUG_SEED", seed);
        cmd.args([
            "augment",
            "tests/fixtures/sample.json",
            "-c",
            "tests/fixtures/crop.yaml",
        ]);
        stdout_document(&mut cmd)
    };
    assert_eq!(run("5"), run("5"));
}

#[test]
fn augment_logs_with_verbose_flag() {
    let mut cmd = boxaug();
    cmd.args([
        "-v",
        "augment",
        "tests/fixtures/sample.json",
        "-c",
        "tests/fixtures/crop.yaml",
        "--seed",
        "1",
    ]);
    cmd.assert()
        .success()
        .stderr(predicates::str::contains("augmented"));
}

#[test]
fn augment_rejects_unknown_transform() {
    let mut cmd = boxaug();
    cmd.args([
        "augment",
        "tests/fixtures/sample.json",
        "-c",
        "tests/fixtures/invalid.yaml",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse pipeline config"));
}

#[test]
fn augment_reports_label_mismatch() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.json");
    common::write_file(
        &input,
        r#"{"height": 512, "width": 384, "bboxes": [[1, 2, 30, 40]], "labels": {"labels": []}}"#,
    );

    let mut cmd = boxaug();
    cmd.args(["augment", "-c", "tests/fixtures/crop.yaml"]);
    cmd.arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Label field 'labels' has 0 value(s)"));
}

// Replay subcommand tests

#[test]
fn replay_reproduces_augment_output() {
    let temp = tempfile::tempdir().unwrap();
    let first = temp.path().join("first.json");
    let second = temp.path().join("second.json");

    let mut cmd = boxaug();
    cmd.args([
        "augment",
        "tests/fixtures/sample.json",
        "-c",
        "tests/fixtures/crop.yaml",
        "--seed",
        "99",
        "-o",
    ]);
    cmd.arg(&first);
    cmd.assert().success();

    let mut cmd = boxaug();
    cmd.args([
        "replay",
        "tests/fixtures/sample.json",
        "-c",
        "tests/fixtures/crop.yaml",
        "--trace",
    ]);
    cmd.arg(&first).arg("-o").arg(&second);
    cmd.assert().success();

    assert_eq!(read_document(&first).unwrap(), read_document(&second).unwrap());
}

#[test]
fn replay_rejects_trace_of_another_pipeline() {
    let temp = tempfile::tempdir().unwrap();
    let trace = temp.path().join("trace.json");
    common::write_file(&trace, r#"[{"transform": "NoOp", "applied": true}]"#);

    let mut cmd = boxaug();
    cmd.args([
        "replay",
        "tests/fixtures/sample.json",
        "-c",
        "tests/fixtures/crop.yaml",
        "-t",
    ]);
    cmd.arg(&trace);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Replay trace has 1 entries"));
}

// Convert subcommand tests

#[test]
fn convert_coco_to_pascal_voc() {
    let mut cmd = boxaug();
    cmd.args([
        "convert",
        "tests/fixtures/sample.coco.json",
        "--from",
        "coco",
        "--to",
        "pascal_voc",
    ]);
    let doc = stdout_document(&mut cmd);
    let boxes = doc.bboxes.unwrap();
    common::assert_close(boxes[0].values, [20.0, 30.0, 60.0, 80.0]);
    assert_eq!(boxes[0].extra, vec![serde_json::json!(99)]);
    assert!(doc.replay.is_none());
}

#[test]
fn convert_rejects_unknown_format() {
    let mut cmd = boxaug();
    cmd.args([
        "convert",
        "tests/fixtures/sample.coco.json",
        "--from",
        "coco",
        "--to",
        "xywh",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unknown bbox format 'xywh'"));
}
