use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "colonie-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn dashboard() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_colonie-dashboard"));
    command.env_remove("COLONIE_DATA");
    command
}

#[test]
fn cli_list_reports_writes_output() {
    let output_path = temp_path("list");
    let status = dashboard()
        .args(["--list-reports", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available reports"));
    assert!(content.contains("performance-by-difficulty"));
}

#[test]
fn cli_rejects_unknown_report_ids() {
    let output = dashboard()
        .args(["--reports", "global-stats,robots-on-mars", "--format", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown report id: robots-on-mars"));
}

#[test]
fn cli_dumps_dataset_and_reads_it_back() {
    let data_path = temp_path("data");
    let status = dashboard()
        .args(["--seed", "21", "--dump-dataset"])
        .arg(&data_path)
        .status()
        .expect("dump dataset");
    assert!(status.success());

    let report_path = temp_path("report");
    let status = dashboard()
        .args(["--reports", "global-stats,timeline", "--format", "json", "--output"])
        .arg(&report_path)
        .env("COLONIE_DATA", &data_path)
        .status()
        .expect("evaluate reports");
    assert!(status.success());

    let content = std::fs::read_to_string(&report_path).expect("read report");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(parsed["global-stats"][0]["total_actions"], 300);
    assert_eq!(parsed["timeline"].as_array().map(Vec::len), Some(50));
}

#[test]
fn cli_fails_when_data_file_is_missing() {
    let output = dashboard()
        .args(["--reports", "global-stats", "--data"])
        .arg(temp_path("nowhere"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("data store unavailable"));
}

#[test]
fn cli_writes_csv_for_generated_sample() {
    let output_path = temp_path("csv");
    let status = dashboard()
        .args(["--reports", "humans-vulnerability", "--format", "csv", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "report,vulnerability,count");
    assert!(lines[1].starts_with("humans-vulnerability,low,"));
    assert!(lines[3].starts_with("humans-vulnerability,high,"));
}
