use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_kurumsal360d");
    let mut child = Command::new(exe)
        .args(["--backend", "memory"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn kurumsal360d");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn stale_template_load_never_overwrites_the_newer_selection() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "survey.selectTemplate",
        json!({ "templateId": 1 }),
    );
    let first_seq = first["loadSeq"].as_u64().expect("loadSeq");

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "survey.selectTemplate",
        json!({ "templateId": 2 }),
    );
    let second_seq = second["loadSeq"].as_u64().expect("loadSeq");
    assert!(second_seq > first_seq);

    // The load that was issued for the first selection arrives after the
    // user switched templates: it must be dropped.
    let stale = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "survey.loadTemplate",
        json!({ "seq": first_seq }),
    );
    assert_eq!(stale["applied"], false);
    assert_eq!(stale["stale"], true);

    let status = request_ok(&mut stdin, &mut reader, "4", "survey.status", json!({}));
    assert_eq!(status["status"]["templateLoaded"], false);

    // The load for the current selection applies normally.
    let fresh = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "survey.loadTemplate",
        json!({ "seq": second_seq }),
    );
    assert_eq!(fresh["applied"], true);
    assert_eq!(fresh["template"]["id"], 2);

    let _ = child.kill();
}

#[test]
fn reselecting_the_template_discards_previous_answers() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "survey.selectTemplate",
        json!({ "templateId": 1 }),
    );
    request_ok(&mut stdin, &mut reader, "2", "survey.loadTemplate", json!({}));
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "survey.setScore",
        json!({ "questionId": 1, "score": 4 }),
    );

    let status = request_ok(&mut stdin, &mut reader, "4", "survey.status", json!({}));
    assert_eq!(status["status"]["answered"], 1);

    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "survey.selectTemplate",
        json!({ "templateId": 1 }),
    );
    let status = request_ok(&mut stdin, &mut reader, "6", "survey.status", json!({}));
    assert_eq!(status["status"]["answered"], 0);
    assert_eq!(status["status"]["templateLoaded"], false);

    let _ = child.kill();
}
