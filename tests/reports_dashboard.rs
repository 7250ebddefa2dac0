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
fn overall_and_individual_scores_agree() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let overall = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.overall",
        json!({ "periodId": 1, "templateId": 1 }),
    );
    let rows = overall["scores"].as_array().unwrap();
    assert_eq!(rows.len(), 34);
    let row = rows
        .iter()
        .find(|r| r["personId"] == "100")
        .expect("person 100 row");
    let overall_score = row["score"].as_f64().unwrap();
    assert!((1.0..=4.0).contains(&overall_score));

    let person = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.person",
        json!({ "personId": "100", "periodId": 1, "templateId": 1 }),
    );
    let person_score = person["score"].as_f64().unwrap();
    assert!((person_score - overall_score).abs() < 1e-9);

    // percent is the affine transform of the 1-4 score.
    let percent = person["percent"].as_f64().unwrap();
    let expected = ((person_score - 1.0) / 3.0) * 100.0;
    assert!((percent - expected).abs() < 1e-9);

    let _ = child.kill();
}

#[test]
fn profile_resolves_weights_and_role_multipliers() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    // Person 100 is a Harita Mühendisi staff member under the Harita Şefi.
    let profile = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.profile",
        json!({ "personId": 100 }),
    );
    assert_eq!(profile["person"]["title"], "Harita Mühendisi");
    assert_eq!(profile["manager"], "Harita Şefi");

    let weights = profile["questionWeights"].as_array().unwrap();
    assert_eq!(weights.len(), 20);
    let q1 = weights.iter().find(|w| w["questionId"] == 1).unwrap();
    assert!((q1["weight"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    let q2 = weights.iter().find(|w| w["questionId"] == 2).unwrap();
    assert!((q2["weight"].as_f64().unwrap() - 0.6).abs() < 1e-9);

    let multipliers = profile["roleMultipliers"].as_array().unwrap();
    let by_role = |role: &str| {
        multipliers
            .iter()
            .find(|m| m["evaluatorRole"] == role)
            .and_then(|m| m["multiplier"].as_f64())
            .unwrap()
    };
    assert!((by_role("MÜDÜR") - 1.0).abs() < 1e-9);
    assert!((by_role("ŞEF") - 0.8).abs() < 1e-9);
    assert!((by_role("PERSONEL") - 0.5).abs() < 1e-9);

    // A leadership question resolves through the role override for a chief.
    let chief = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.profile",
        json!({ "personId": 11 }),
    );
    let weights = chief["questionWeights"].as_array().unwrap();
    let q12 = weights.iter().find(|w| w["questionId"] == 12).unwrap();
    assert!((q12["weight"].as_f64().unwrap() - 0.8).abs() < 1e-9);

    let _ = child.kill();
}

#[test]
fn question_pool_resolves_for_an_optional_person() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let bare = request_ok(&mut stdin, &mut reader, "1", "questions.pool", json!({}));
    let q1 = bare["questions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == 1)
        .unwrap()
        .clone();
    assert!((q1["resolvedWeight"].as_f64().unwrap() - 0.6).abs() < 1e-9);

    let resolved = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "questions.pool",
        json!({ "personId": 100 }),
    );
    let q1 = resolved["questions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == 1)
        .unwrap()
        .clone();
    assert!((q1["resolvedWeight"].as_f64().unwrap() - 0.8).abs() < 1e-9);

    let _ = child.kill();
}

#[test]
fn dashboard_assignments_and_saved_surveys() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let summary = request_ok(&mut stdin, &mut reader, "1", "dashboard.summary", json!({}));
    assert_eq!(summary["mode"], "memory");
    assert_eq!(summary["peopleCount"], 34);
    assert_eq!(summary["periodCount"], 2);
    assert_eq!(summary["templateCount"], 3);
    assert_eq!(summary["assignmentCount"], 6);
    let recent = summary["recentSurveys"].as_array().unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0]["date"], "2025-04-05");

    let assignments = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "assignments.list",
        json!({ "cycleId": 1 }),
    );
    assert_eq!(assignments["assignments"].as_array().unwrap().len(), 3);

    let mine = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "assignments.list",
        json!({ "cycleId": 1, "evaluatorId": 11 }),
    );
    let mine = mine["assignments"].as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| {
        a["evaluators"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == 11)
    }));

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "surveys.saved",
        json!({ "cycleId": 2 }),
    );
    let saved = saved["surveys"].as_array().unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().any(|s| s["status"] == "Tamamlandı"));

    let people = request_ok(&mut stdin, &mut reader, "5", "people.directory", json!({}));
    let directory = people["people"].as_array().unwrap();
    assert_eq!(directory.len(), 34);
    let p1 = directory.iter().find(|p| p["id"] == 100).unwrap();
    assert_eq!(p1["manager"], "Harita Şefi");

    let titles = request_ok(&mut stdin, &mut reader, "6", "people.titles", json!({}));
    assert!(titles["titles"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t == "CBS Uzmanı"));

    let _ = child.kill();
}
