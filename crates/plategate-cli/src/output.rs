//! Output formatting module

use serde::Serialize;

use plategate_app::app::{GateOutcome, GateReport, PlateOrigin};
use plategate_store::RegistryStats;
use plategate_types::{AccessAttempt, CandidateReading, OutputFormat, RegisteredVehicle, Result};

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_candidate(candidate: &CandidateReading) {
    if candidate.is_empty() {
        println!("OCR reading:     (none)");
    } else {
        println!(
            "OCR reading:     {} ({:.0}%, {})",
            candidate.text,
            candidate.confidence * 100.0,
            candidate.source
        );
    }
}

fn print_report(report: &GateReport) {
    if let Some(ref candidate) = report.candidate {
        print_candidate(candidate);
    }
    let origin = match report.origin {
        PlateOrigin::Ocr => "ocr",
        PlateOrigin::Manual => "manual",
    };
    println!("Plate:           {} ({})", report.plate, origin);
    println!("Plausible:       {}", yes_no(report.plausible));
    println!(
        "Color:           {} ({:.0}%)",
        report.color.label,
        report.color.confidence * 100.0
    );
    println!(
        "Make/model:      {} ({:.0}%)",
        report.make.label,
        report.make.confidence * 100.0
    );

    let decision = &report.decision;
    if let Some(ref plate) = decision.matched_plate {
        println!("Registered:      {} (score {:.2})", plate, decision.match_score);
    }
    if let Some(compatible) = decision.color_compatible {
        println!("Color match:     {}", yes_no(compatible));
    }
    if report.registry_degraded {
        println!("Registry:        unavailable (treated as empty)");
    }
    println!("Logged:          {}", yes_no(report.logged));
    println!();
    println!(
        "{}: {}",
        if decision.granted { "ACCESS GRANTED" } else { "ACCESS DENIED" },
        decision.reason
    );
}

pub fn output_outcome(output_format: OutputFormat, outcome: &GateOutcome) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(outcome);
    }

    println!("\nGate Result");
    println!("===========");
    match outcome {
        GateOutcome::NoPlateDetected => println!("No license plate detected in this image."),
        GateOutcome::ManualEntryRequired { candidate } => {
            print_candidate(candidate);
            println!("OCR could not read the plate. Re-run with --plate <PLATE>.");
        }
        GateOutcome::Decided(report) => print_report(report),
    }
    Ok(())
}

pub fn output_report(output_format: OutputFormat, report: &GateReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }

    println!("\nGate Result");
    println!("===========");
    print_report(report);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RecognitionOutput {
    pub image: String,
    pub plate_found: bool,
    pub candidate: CandidateReading,
    pub plausible: bool,
}

pub fn output_recognition(output_format: OutputFormat, output: &RecognitionOutput) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(output);
    }

    println!("Image:           {}", output.image);
    if !output.plate_found {
        println!("No license plate detected in this image.");
        return Ok(());
    }
    print_candidate(&output.candidate);
    println!("Plausible:       {}", yes_no(output.plausible));
    Ok(())
}

pub fn output_vehicles(output_format: OutputFormat, vehicles: &[RegisteredVehicle]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(vehicles);
    }

    if vehicles.is_empty() {
        println!("No vehicles registered.");
        return Ok(());
    }

    println!(
        "{:<12} {:<10} {:<20} {:<16} {}",
        "Plate", "Color", "Make/model", "Owner", "ID"
    );
    println!("{}", "-".repeat(96));
    for v in vehicles {
        println!(
            "{:<12} {:<10} {:<20} {:<16} {}",
            v.record.plate_number, v.record.color, v.record.make_model, v.record.owner_name, v.id
        );
    }
    println!("\n{} vehicle(s)", vehicles.len());
    Ok(())
}

pub fn output_stats(output_format: OutputFormat, stats: &RegistryStats) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(stats);
    }

    println!("=== Registry ===");
    println!("Vehicles:        {}", stats.total);
    println!("Unique colors:   {}", stats.unique_colors);
    println!("Unique makes:    {}", stats.unique_makes);
    println!("With owners:     {}", stats.with_owners);

    println!("\nTop colors:");
    for (color, count) in &stats.top_colors {
        println!("  {:<16} {}", color, count);
    }
    println!("\nTop makes:");
    for (make, count) in &stats.top_makes {
        println!("  {:<16} {}", make, count);
    }

    println!("\nRegistered today:      {}", stats.registered_today);
    println!("Registered this week:  {}", stats.registered_this_week);
    println!("Registered this month: {}", stats.registered_this_month);

    if !stats.recent.is_empty() {
        println!("\nRecent registrations:");
        for v in &stats.recent {
            println!(
                "  {:<12} {:<20} {:<10} {:<16} {}",
                v.record.plate_number,
                v.record.make_model,
                v.record.color,
                v.record.owner_name,
                v.registered_at.format("%Y-%m-%d")
            );
        }
    }
    Ok(())
}

pub fn output_access_log(output_format: OutputFormat, entries: &[AccessAttempt]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(entries);
    }

    if entries.is_empty() {
        println!("No access attempts recorded.");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<10} {:<20} {:<8} {}",
        "Time", "Plate", "Color", "Make/model", "Access", "Color ok"
    );
    println!("{}", "-".repeat(84));
    for e in entries {
        println!(
            "{:<20} {:<12} {:<10} {:<20} {:<8} {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.plate_number,
            e.detected_color,
            e.detected_model,
            if e.plate_matched { "granted" } else { "denied" },
            yes_no(e.color_matched)
        );
    }
    Ok(())
}
