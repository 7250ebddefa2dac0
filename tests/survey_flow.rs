use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_daemon(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_kurumsal360d");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn kurumsal360d");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
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
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    expected_code: &str,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    let error = value.get("error").cloned().expect("error object");
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some(expected_code),
        "wrong code: {}",
        error
    );
    error
}

fn template_question_ids(template: &serde_json::Value) -> Vec<i64> {
    template["topics"]
        .as_array()
        .expect("topics")
        .iter()
        .flat_map(|t| t["questions"].as_array().expect("questions").iter())
        .map(|q| q["id"].as_i64().expect("question id"))
        .collect()
}

#[test]
fn survey_submission_flow_end_to_end() {
    let (mut child, mut stdin, mut reader) = spawn_daemon(&["--backend", "memory"]);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "survey.open",
        json!({ "periodId": 1, "evaluateeId": "100", "evaluator": "11" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "survey.selectTemplate",
        json!({ "templateId": 1 }),
    );
    let loaded = request_ok(&mut stdin, &mut reader, "3", "survey.loadTemplate", json!({}));
    assert_eq!(loaded["applied"], true);
    let question_ids = template_question_ids(&loaded["template"]);
    assert_eq!(question_ids.len(), 20);

    // Score two questions, then try submitting the incomplete form.
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "survey.setScore",
        json!({ "questionId": question_ids[0], "score": 3 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "survey.setScore",
        json!({ "questionId": question_ids[1], "score": 4 }),
    );
    let error = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "survey.submit",
        json!({}),
        "incomplete_answers",
    );
    assert_eq!(error["details"]["answered"], 2);
    assert_eq!(error["details"]["total"], 20);

    // The acknowledgement flag lets the partial submission through.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "survey.submit",
        json!({ "allowIncomplete": true }),
    );
    assert_eq!(result["submitted"], 2);

    // Submission resets the form.
    let status = request_ok(&mut stdin, &mut reader, "8", "survey.status", json!({}));
    assert_eq!(status["status"]["templateId"], serde_json::Value::Null);

    let _ = child.kill();
}

#[test]
fn complete_anonymous_submission_needs_no_acknowledgement() {
    let (mut child, mut stdin, mut reader) = spawn_daemon(&["--backend", "memory"]);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "survey.open",
        json!({ "periodId": 2, "evaluateeId": "11", "evaluator": "anonim" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "survey.selectTemplate",
        json!({ "templateId": 2 }),
    );
    let loaded = request_ok(&mut stdin, &mut reader, "3", "survey.loadTemplate", json!({}));
    assert_eq!(loaded["applied"], true);

    for (i, qid) in template_question_ids(&loaded["template"]).iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{}", i),
            "survey.setScore",
            json!({ "questionId": qid, "score": 1 + (i as i64 % 4) }),
        );
    }

    let result = request_ok(&mut stdin, &mut reader, "99", "survey.submit", json!({}));
    assert_eq!(result["submitted"], 20);

    let _ = child.kill();
}

#[test]
fn scores_are_validated_against_the_loaded_template() {
    let (mut child, mut stdin, mut reader) = spawn_daemon(&["--backend", "memory"]);

    // No template loaded yet.
    request_err(
        &mut stdin,
        &mut reader,
        "1",
        "survey.setScore",
        json!({ "questionId": 1, "score": 3 }),
        "bad_params",
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "survey.selectTemplate",
        json!({ "templateId": 1 }),
    );
    request_ok(&mut stdin, &mut reader, "3", "survey.loadTemplate", json!({}));

    request_err(
        &mut stdin,
        &mut reader,
        "4",
        "survey.setScore",
        json!({ "questionId": 99999, "score": 3 }),
        "bad_params",
    );
    request_err(
        &mut stdin,
        &mut reader,
        "5",
        "survey.setScore",
        json!({ "questionId": 1, "score": 9 }),
        "bad_params",
    );

    // Submitting without the full selection set is refused.
    request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "survey.setScore",
        json!({ "questionId": 1, "score": 2 }),
    );
    request_err(
        &mut stdin,
        &mut reader,
        "7",
        "survey.submit",
        json!({ "allowIncomplete": true }),
        "bad_params",
    );

    let _ = child.kill();
}
