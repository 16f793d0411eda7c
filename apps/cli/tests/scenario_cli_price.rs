use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn shipped_catalog() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../crates/tally-core/catalogs/telecom.toml")
}

fn tally() -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("tally")?;
    cmd.env_remove("TALLY_CATALOG")
        .env("RUST_LOG", "warn")
        .arg("--catalog")
        .arg(shipped_catalog());
    Ok(cmd)
}

#[test]
fn cli_price_three_small_one_large() -> anyhow::Result<()> {
    tally()?
        .args(["price", "ult_small", "ult_small", "ult_small", "ult_large"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: $94.70"))
        .stdout(predicate::str::contains("bundle_deal:ult_small"));
    Ok(())
}

#[test]
fn cli_price_lists_free_companions() -> anyhow::Result<()> {
    tally()?
        .args(["price", "ult_small", "ult_medium", "ult_medium"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Free items (2):"))
        .stdout(predicate::str::contains("1 GB Data-pack (1gb)"))
        .stdout(predicate::str::contains("Total: $84.70"));
    Ok(())
}

#[test]
fn cli_price_with_promo_code() -> anyhow::Result<()> {
    tally()?
        .args(["price", "--promo", "I<3AMAYSIM", "ult_small", "1gb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Promo codes: I<3AMAYSIM"))
        .stdout(predicate::str::contains("Total: $31.32"));
    Ok(())
}

#[test]
fn cli_price_unknown_code_fails() -> anyhow::Result<()> {
    tally()?
        .args(["price", "ult_small", "ult_huge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ult_huge"));
    Ok(())
}

#[test]
fn cli_price_json_summary() -> anyhow::Result<()> {
    let output = tally()?
        .args(["--json", "price", "ult_small", "ult_small"])
        .args(["ult_large"; 5])
        .output()?;
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["total"], 24930);
    assert_eq!(summary["item_count"], 7);
    assert_eq!(summary["adjustments"].as_array().map(Vec::len), Some(5));
    Ok(())
}

#[test]
fn cli_missing_catalog_file_fails() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tally")?;
    cmd.env_remove("TALLY_CATALOG")
        .args(["--catalog", "/nonexistent/catalog.toml", "products"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read catalog"));
    Ok(())
}

#[test]
fn cli_default_logging_omits_rule_trace() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tally")?;
    cmd.env_remove("TALLY_CATALOG")
        .env_remove("RUST_LOG")
        .arg("--catalog")
        .arg(shipped_catalog())
        .args(["price", "ult_small", "ult_large"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Catalog loaded"))
        .stderr(predicate::str::contains("Pricing rule applied").not())
        .stderr(predicate::str::contains("DEBUG").not());
    Ok(())
}
