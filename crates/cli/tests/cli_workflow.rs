use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn brandstock(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("brandstock").unwrap();
    cmd.env("BRANDSTOCK_DATA_DIR", dir.path())
        .env("BRANDSTOCK_ADMIN_PASSWORD", "test")
        .env_remove("BRANDSTOCK_BRANDS")
        .env("RUST_LOG", "off")
        .args(["--brand", "takokak"]);
    cmd
}

fn pending_ids(dir: &TempDir) -> Vec<String> {
    let out = brandstock(dir).args(["--format", "json", "pending"]).output().unwrap();
    let requests: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    requests
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn out_and_return_via_cli() {
    let dir = TempDir::new().unwrap();

    brandstock(&dir)
        .args(["add-item", "--code", "ITM-1", "--name", "Kerupuk", "--unit", "pcs", "--qty", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added ITM-1"));

    brandstock(&dir)
        .args(["submit", "out", "--item", "ITM-1", "--qty", "30", "--unit", "pcs", "--type", "Sale", "--event", "Expo"])
        .assert()
        .success();
    let ids = pending_ids(&dir);
    assert_eq!(ids.len(), 1);
    brandstock(&dir)
        .args(["approve", &ids[0]])
        .assert()
        .success()
        .stdout(predicate::str::contains("stock now 70"));

    brandstock(&dir)
        .args(["submit", "return", "--item", "ITM-1", "--qty", "10", "--unit", "pcs", "--event", "Expo"])
        .assert()
        .success();
    let ids = pending_ids(&dir);
    brandstock(&dir).args(["approve", &ids[0]]).assert().success();

    let out = brandstock(&dir)
        .args(["--format", "json", "stock-card", "ITM-1"])
        .output()
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let balances: Vec<i64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["balance"].as_i64().unwrap())
        .collect();
    assert_eq!(balances, [100, 70, 80]);
}

#[test]
fn failed_approval_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    brandstock(&dir)
        .args(["add-item", "--code", "ITM-1", "--name", "Kerupuk", "--unit", "pcs", "--qty", "5"])
        .assert()
        .success();
    brandstock(&dir)
        .args(["submit", "out", "--item", "ITM-1", "--qty", "50", "--unit", "pcs", "--type", "support", "--event", "Expo"])
        .assert()
        .success();
    let ids = pending_ids(&dir);

    brandstock(&dir)
        .args(["approve", &ids[0]])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"));
    assert_eq!(pending_ids(&dir).len(), 1);
}

#[test]
fn reset_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    brandstock(&dir).arg("reset").assert().failure();
    brandstock(&dir).args(["reset", "--yes"]).assert().success();
}
