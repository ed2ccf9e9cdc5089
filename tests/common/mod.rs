use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use slotbook::domain::time::next_full_hour;
use std::fs::File;
use std::io::Error;
use std::path::Path;

/// A slot start that exists in the binary's booking window even if the wall
/// clock crosses an hour boundary between test setup and execution.
pub fn slot_start(hours_ahead: i64) -> DateTime<Utc> {
    next_full_hour(Utc::now()) + Duration::hours(hours_ahead)
}

/// Generates a booking script with a realistic mix of operations. Most rows
/// are reservations; cancels, proofs and sweeps are sprinkled in. Domain
/// rejections (occupied slots, missing active orders) are part of the soak.
pub fn generate_script(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["op", "requester", "start", "image", "note"])?;

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let requester = format!("user{}", rng.gen_range(1..=50));
        match rng.gen_range(0..10) {
            0..=5 => {
                let start = slot_start(rng.gen_range(2..70)).to_rfc3339();
                wtr.write_record(["reserve", &requester, &start, "", ""])?;
            }
            6..=7 => {
                wtr.write_record(["cancel", &requester, "", "", ""])?;
            }
            8 => {
                wtr.write_record([
                    "proof",
                    &requester,
                    "",
                    "https://img.example/proof.png",
                    "paid",
                ])?;
            }
            _ => {
                wtr.write_record(["sweep", "", "", "", ""])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
