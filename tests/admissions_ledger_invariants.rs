use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_academyd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn academyd");
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
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
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

fn request_err_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert!(
        !value.get("ok").and_then(|v| v.as_bool()).unwrap_or(true),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

fn setup_course(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &PathBuf,
    title: &str,
    fee: i64,
) -> i64 {
    let _ = request_ok(
        stdin,
        reader,
        "setup-ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        stdin,
        reader,
        "setup-course",
        "courses.create",
        json!({ "title": title, "fixedFee": fee }),
    );
    created
        .get("course")
        .and_then(|c| c.get("id"))
        .and_then(|v| v.as_i64())
        .expect("course id")
}

fn admission_params(course_id: i64, total_fee: i64, paid: i64) -> serde_json::Value {
    json!({
        "studentName": "Ayesha Khan",
        "phone": "0300-1234567",
        "courseId": course_id,
        "totalFee": total_fee,
        "paidAmount": paid,
        "dueDate": "2030-01-15"
    })
}

#[test]
fn partial_then_full_payment_end_to_end() {
    let workspace = temp_dir("academy-ledger-e2e");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let course_id = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "admissions.create",
        admission_params(course_id, 50_000, 20_000),
    );
    let adm = first.get("admission").expect("admission");
    assert_eq!(adm.get("remainingAmount").and_then(|v| v.as_i64()), Some(30_000));
    assert_eq!(adm.get("settled").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(adm.get("dueDate").and_then(|v| v.as_str()), Some("2030-01-15"));
    assert!(adm.get("screenshotUrl").map(|v| v.is_null()).unwrap_or(false));

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "admissions.create",
        admission_params(course_id, 50_000, 50_000),
    );
    let adm2 = second.get("admission").expect("admission");
    assert_eq!(adm2.get("remainingAmount").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(adm2.get("settled").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn caller_supplied_remaining_amount_is_overwritten() {
    let workspace = temp_dir("academy-ledger-remaining");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let course_id = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let mut params = admission_params(course_id, 50_000, 20_000);
    // A stale or hostile client value; the ledger must recompute.
    params["remainingAmount"] = json!(1);
    let created = request_ok(&mut stdin, &mut reader, "1", "admissions.create", params);
    assert_eq!(
        created
            .get("admission")
            .and_then(|a| a.get("remainingAmount"))
            .and_then(|v| v.as_i64()),
        Some(30_000)
    );
}

#[test]
fn fee_mismatch_is_rejected_without_persisting() {
    let workspace = temp_dir("academy-ledger-fee-mismatch");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let course_id = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "1",
        "admissions.create",
        admission_params(course_id, 40_000, 10_000),
    );
    assert_eq!(code, "invalid_params");

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "admissions.list",
        json!({ "page": 1 }),
    );
    assert_eq!(list.get("total").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(
        list.get("items").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn overpayment_is_rejected() {
    let workspace = temp_dir("academy-ledger-overpay");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let course_id = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "1",
        "admissions.create",
        admission_params(course_id, 50_000, 60_000),
    );
    assert_eq!(code, "invalid_params");
}

#[test]
fn unknown_course_is_unavailable() {
    let workspace = temp_dir("academy-ledger-no-course");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "1",
        "admissions.create",
        admission_params(424_242, 50_000, 0),
    );
    assert_eq!(code, "not_found");
}

#[test]
fn missing_fields_and_bad_dates_are_rejected() {
    let workspace = temp_dir("academy-ledger-missing");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let course_id = setup_course(&mut stdin, &mut reader, &workspace, "Design-101", 50_000);

    let mut no_name = admission_params(course_id, 50_000, 0);
    no_name["studentName"] = json!("   ");
    assert_eq!(
        request_err_code(&mut stdin, &mut reader, "1", "admissions.create", no_name),
        "invalid_params"
    );

    let mut no_phone = admission_params(course_id, 50_000, 0);
    no_phone["phone"] = json!("");
    assert_eq!(
        request_err_code(&mut stdin, &mut reader, "2", "admissions.create", no_phone),
        "invalid_params"
    );

    let mut bad_date = admission_params(course_id, 50_000, 0);
    bad_date["dueDate"] = json!("15/01/2030");
    assert_eq!(
        request_err_code(&mut stdin, &mut reader, "3", "admissions.create", bad_date),
        "invalid_params"
    );

    let mut no_date = admission_params(course_id, 50_000, 0);
    no_date["dueDate"] = json!("");
    assert_eq!(
        request_err_code(&mut stdin, &mut reader, "4", "admissions.create", no_date),
        "invalid_params"
    );

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "admissions.list",
        json!({ "page": 1 }),
    );
    assert_eq!(list.get("total").and_then(|v| v.as_i64()), Some(0));
}
