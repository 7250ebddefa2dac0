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

fn expect_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    code: &str,
) {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        value["error"]["code"].as_str(),
        Some(code),
        "unexpected error: {}",
        value
    );
}

#[test]
fn period_lifecycle_with_date_validation() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let seeded = request_ok(&mut stdin, &mut reader, "1", "periods.list", json!({}));
    assert_eq!(seeded["periods"].as_array().unwrap().len(), 2);

    expect_code(
        &mut stdin,
        &mut reader,
        "2",
        "periods.create",
        json!({ "name": "2026 Yıllık 360°", "startsOn": "2026-12-31", "endsOn": "2026-01-01" }),
        "bad_params",
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "periods.create",
        json!({ "name": "2026 Yıllık 360°", "startsOn": "2026-01-01", "endsOn": "2026-12-31" }),
    );
    let period_id = created["period"]["id"].as_i64().unwrap();

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "periods.update",
        json!({
            "id": period_id,
            "name": "2026 Ara Dönem",
            "startsOn": "2026-03-01",
            "endsOn": "2026-09-30",
        }),
    );
    assert_eq!(updated["period"]["name"], "2026 Ara Dönem");
    assert_eq!(updated["period"]["startsOn"], "2026-03-01");

    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "periods.delete",
        json!({ "id": period_id }),
    );
    expect_code(
        &mut stdin,
        &mut reader,
        "6",
        "periods.delete",
        json!({ "id": period_id }),
        "not_found",
    );

    let _ = child.kill();
}

#[test]
fn weight_sets_topic_weights_and_title_assignments() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "weightSets.create",
        json!({ "name": "Uzman Ağırlıkları", "description": "Uzman kadro için" }),
    );
    let set_id = created["weightSet"]["id"].as_i64().unwrap();

    let topics = request_ok(&mut stdin, &mut reader, "2", "topics.list", json!({}));
    let topic_a = topics["topics"][0]["id"].as_i64().unwrap();
    let topic_b = topics["topics"][1]["id"].as_i64().unwrap();

    expect_code(
        &mut stdin,
        &mut reader,
        "3",
        "weightSets.setTopicWeight",
        json!({ "setId": set_id, "topicId": topic_a, "weight": 1.5 }),
        "bad_params",
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "weightSets.setTopicWeight",
        json!({ "setId": set_id, "topicId": topic_a, "weight": 0.7 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "weightSets.setTopicWeight",
        json!({ "setId": set_id, "topicId": topic_b, "weight": 0.6 }),
    );

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "weightSets.get",
        json!({ "id": set_id }),
    );
    assert_eq!(detail["weightSet"]["topicWeights"].as_array().unwrap().len(), 2);
    assert!((detail["totalWeight"].as_f64().unwrap() - 1.3).abs() < 1e-9);
    assert_eq!(detail["overLimit"], true);

    // Zero clears an override.
    request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "weightSets.setTopicWeight",
        json!({ "setId": set_id, "topicId": topic_b, "weight": 0 }),
    );
    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "weightSets.get",
        json!({ "id": set_id }),
    );
    assert_eq!(detail["weightSet"]["topicWeights"].as_array().unwrap().len(), 1);
    assert_eq!(detail["overLimit"], false);

    expect_code(
        &mut stdin,
        &mut reader,
        "9",
        "weightSets.assignTitle",
        json!({ "title": "Uzay Mühendisi", "setId": set_id }),
        "not_found",
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "weightSets.assignTitle",
        json!({ "title": "CBS Uzmanı", "setId": set_id }),
    );
    let assignments = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "weightSets.assignments",
        json!({}),
    );
    assert_eq!(assignments["assignments"][0]["title"], "CBS Uzmanı");
    assert_eq!(assignments["assignments"][0]["weightSetId"], set_id);

    request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "weightSets.removeTitle",
        json!({ "title": "CBS Uzmanı" }),
    );
    let assignments = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "weightSets.assignments",
        json!({}),
    );
    assert!(assignments["assignments"].as_array().unwrap().is_empty());

    // Deleting the set clears its weights and assignments with it.
    request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "weightSets.delete",
        json!({ "id": set_id }),
    );
    expect_code(
        &mut stdin,
        &mut reader,
        "15",
        "weightSets.get",
        json!({ "id": set_id }),
        "not_found",
    );

    let _ = child.kill();
}
