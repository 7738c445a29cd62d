//! OPEGrade demo: the concrete grading scenario plus a boundary-fuzz sweep.

use csv::Writer;
use opegrade_core::{ChoiceGrader, RangeGrader};
use std::error::Error;
use std::time::Instant;

fn main() -> Result<(), Box<dyn Error>> {
    // -------------- measurement CSV writer --------------
    let mut wtr = Writer::from_path("boundary_stats.csv")?;
    wtr.write_record(&["value", "trials", "accepted", "accept_rate"])?;

    let trials = 500u32;

    println!("RangeGrader over (10, 20):");
    let grader = RangeGrader::new(10.0, 20.0)?;
    for value in [5.0, 10.0, 15.0, 20.0, 25.0] {
        announce(value, grader.grade(value)?);
    }

    println!("\nChoiceGrader over \"B\":");
    let choice = ChoiceGrader::new("B");
    for value in ["B", "A", "b"] {
        if choice.grade(value) {
            println!("{value} is correct");
        } else {
            println!("{value} is incorrect");
        }
    }

    // Boundary-fuzz sweep: a fresh grader per trial, accept rate per value.
    // Two units away the rate must pin to 0 or 1; at the true bounds the
    // randomized thresholds leave it strictly in between.
    println!("\nBoundary sweep ({trials} fresh graders per value):");
    let start = Instant::now();
    for value in 8..=22 {
        let mut accepted = 0u32;
        for _ in 0..trials {
            let g = RangeGrader::new(10.0, 20.0)?;
            if g.grade(f64::from(value))? {
                accepted += 1;
            }
        }
        let rate = f64::from(accepted) / f64::from(trials);
        println!("value {value:>2}: accept rate {rate:.3}");
        wtr.write_record(&[
            value.to_string(),
            trials.to_string(),
            accepted.to_string(),
            format!("{rate:.4}"),
        ])?;
    }
    println!("sweep time: {:?}", start.elapsed());

    // Persistence round trip: the artifact an author would hand off.
    let path = std::env::temp_dir().join("range.grader");
    grader.save(&path)?;
    let loaded = RangeGrader::load(&path)?;
    println!(
        "\nreloaded grader agrees on 15: {}",
        grader.grade(15.0)? == loaded.grade(15.0)?
    );

    wtr.flush()?;
    Ok(())
}

fn announce(value: f64, correct: bool) {
    if correct {
        println!("{value} is correct");
    } else {
        println!("{value} is incorrect");
    }
}
