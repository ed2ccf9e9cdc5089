mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let start = common::slot_start(5).to_rfc3339();
    let mut file = NamedTempFile::new()?;
    writeln!(file, "op, requester, start, image, note")?;
    writeln!(file, "reserve, alice, {start}, ,")?;

    let mut cmd = Command::new(cargo_bin!("slotbook"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "id,requester,order_no,status,start_time,end_time,amount,proofs",
        ))
        .stdout(predicate::str::contains("1,alice,BK"))
        .stdout(predicate::str::contains(",pending,"));

    Ok(())
}

#[test]
fn test_cli_proof_and_cancel_flow() -> Result<(), Box<dyn std::error::Error>> {
    let alice_start = common::slot_start(5).to_rfc3339();
    let bob_start = common::slot_start(6).to_rfc3339();
    let mut file = NamedTempFile::new()?;
    writeln!(file, "op, requester, start, image, note")?;
    writeln!(file, "reserve, alice, {alice_start}, ,")?;
    writeln!(file, "proof, alice, , https://img.example/1.png, paid")?;
    writeln!(file, "reserve, bob, {bob_start}, ,")?;
    writeln!(file, "cancel, bob, , ,")?;

    let mut cmd = Command::new(cargo_bin!("slotbook"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",proof_submitted,"))
        .stdout(predicate::str::contains(",cancelled,"))
        // One proof attached to alice's order.
        .stdout(predicate::str::is_match("(?m)^1,alice,.*,1$")?);

    Ok(())
}

#[test]
fn test_cli_sweep_expires_zero_hold() -> Result<(), Box<dyn std::error::Error>> {
    let start = common::slot_start(5).to_rfc3339();
    let mut file = NamedTempFile::new()?;
    writeln!(file, "op, requester, start, image, note")?;
    writeln!(file, "reserve, alice, {start}, ,")?;
    writeln!(file, "sweep, , , ,")?;

    let mut cmd = Command::new(cargo_bin!("slotbook"));
    cmd.arg(file.path()).arg("--hold-minutes").arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",expired,"));

    Ok(())
}

#[test]
fn test_cli_pricing_flag() -> Result<(), Box<dyn std::error::Error>> {
    let start = common::slot_start(5).to_rfc3339();
    let mut file = NamedTempFile::new()?;
    writeln!(file, "op, requester, start, image, note")?;
    writeln!(file, "reserve, alice, {start}, ,")?;

    let mut cmd = Command::new(cargo_bin!("slotbook"));
    cmd.arg(file.path()).arg("--price-per-hour").arg("30.5");

    // One-hour slot at 30.5/hour.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",30.5,"));

    Ok(())
}
