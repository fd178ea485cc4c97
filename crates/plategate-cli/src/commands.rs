//! Command handlers

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::warn;

use plategate_app::app::{
    locator_from_config, recognizer_from_config, selector_from_config, AccessGate, GateOutcome,
};
use plategate_app::config::{Config, CONFIG_KEYS};
use plategate_app::repository::{open_registry_at, open_vehicle_store};
use plategate_app::scanner::{load_image, scan_directory};
use plategate_domain::repository::AccessLogSink;
use plategate_domain::service::{
    clean_detected_plate, expand_variants, is_plausible_plate, normalize_candidate, similarity,
};
use plategate_infra::CsvAccessLog;
use plategate_types::{
    AttemptFilter, ConfigError, Error, OutputFormat, Result, StoreError, VehicleRecord,
};
use plategate_vision::{DebugDumpObserver, NoopObserver, PlateCrop, RecognitionObserver};

use crate::cli::{Cli, Commands, VehicleAction};
use crate::output::{
    output_access_log, output_outcome, output_recognition, output_report, output_stats,
    output_vehicles, print_json, RecognitionOutput,
};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if cli.registry.is_some() {
        config.registry_path = cli.registry.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Check {
            image,
            plate,
            crop,
            dump_dir,
            no_log,
        } => {
            if no_log {
                config.logging_enabled = false;
            }
            cmd_check(&config, image, plate, crop, dump_dir, output_format)
        }

        Commands::Decide {
            plate,
            color,
            make,
            no_log,
        } => {
            if no_log {
                config.logging_enabled = false;
            }
            cmd_decide(&config, &plate, &color, &make, output_format)
        }

        Commands::Recognize {
            image,
            crop,
            dump_dir,
        } => cmd_recognize(&config, image, crop, dump_dir, output_format),

        Commands::Batch {
            folder,
            output,
            jobs,
            no_log,
        } => {
            if no_log {
                config.logging_enabled = false;
            }
            // Use CLI jobs if specified, otherwise default 4. 0 = auto CPU count.
            let job_count = match jobs {
                Some(0) => num_cpus::get(),
                Some(n) => n,
                None => 4,
            };
            cmd_batch(&config, folder, output, job_count, cli.verbose, output_format)
        }

        Commands::Vehicle { action } => cmd_vehicle(&config, action, output_format),

        Commands::Variants { plate } => cmd_variants(&plate, output_format),

        Commands::Similarity {
            detected,
            registered,
        } => cmd_similarity(&detected, &registered, output_format),

        Commands::Validate { text } => cmd_validate(&text, output_format),

        Commands::Logs {
            limit,
            denied,
            granted,
        } => {
            let filter = match (denied, granted) {
                (true, _) => AttemptFilter::Denied,
                (_, true) => AttemptFilter::Granted,
                _ => AttemptFilter::All,
            };
            cmd_logs(&config, limit, filter, output_format)
        }

        Commands::Config { show, set, reset } => cmd_config(show, set, reset),
    }
}

fn observer_for(dump_dir: Option<PathBuf>) -> Box<dyn RecognitionObserver> {
    match dump_dir {
        Some(dir) => Box::new(DebugDumpObserver::new(dir)),
        None => Box::new(NoopObserver),
    }
}

fn cmd_check(
    config: &Config,
    image: PathBuf,
    plate: Option<String>,
    crop: bool,
    dump_dir: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let frame = load_image(&image)?;
    let gate = AccessGate::from_config(config)?
        .with_observer(observer_for(dump_dir));

    let outcome = if crop {
        gate.process_crop(&PlateCrop::new(frame.clone()), &frame, plate.as_deref())
    } else {
        gate.process_frame(&frame, plate.as_deref())?
    };

    output_outcome(output_format, &outcome)
}

fn cmd_decide(
    config: &Config,
    plate: &str,
    color: &str,
    make: &str,
    output_format: OutputFormat,
) -> Result<()> {
    let gate = AccessGate::from_config(config)?;
    let report = gate.decide(&clean_detected_plate(plate), color, make);
    output_report(output_format, &report)
}

fn cmd_recognize(
    config: &Config,
    image: PathBuf,
    crop: bool,
    dump_dir: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let frame = load_image(&image)?;

    let plate_crop = if crop {
        Some(PlateCrop::new(frame))
    } else {
        locator_from_config(config)?.locate(&frame)?
    };

    let candidate = match plate_crop {
        Some(ref plate_crop) => {
            let recognizer = recognizer_from_config(config)?;
            let observer = observer_for(dump_dir);
            selector_from_config(config).select(plate_crop, recognizer.as_ref(), observer.as_ref())
        }
        None => plategate_types::CandidateReading::empty(),
    };

    let output = RecognitionOutput {
        image: image.display().to_string(),
        plate_found: plate_crop.is_some(),
        plausible: is_plausible_plate(&candidate.text),
        candidate,
    };
    output_recognition(output_format, &output)
}

/// Outcome of one image in a batch run
#[derive(Debug, Serialize)]
struct BatchEntry {
    image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<GateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchResults {
    entries: Vec<BatchEntry>,
    total_processed: usize,
    granted: usize,
    denied: usize,
    manual_entry_required: usize,
    no_plate_detected: usize,
    failed: usize,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

fn cmd_batch(
    config: &Config,
    folder: PathBuf,
    output: Option<PathBuf>,
    jobs: usize,
    verbose: bool,
    output_format: OutputFormat,
) -> Result<()> {
    // Scan directory
    let images = scan_directory(&folder)?;

    if images.is_empty() {
        return Err(Error::FileNotFound(format!(
            "No images found in {}",
            folder.display()
        )));
    }

    let total_images = images.len();
    let jobs = jobs.clamp(1, total_images);
    if verbose {
        eprintln!("Found {} images to process with {} parallel jobs", total_images, jobs);
    }

    let gate = Arc::new(AccessGate::from_config(config)?);

    // Setup progress bar
    let pb = ProgressBar::new(total_images as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map_err(|e| Error::InvalidInput(e.to_string()))?
            .progress_chars("#>-"),
    );

    // Shared results collector
    let results: Arc<Mutex<Vec<BatchEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let images = Arc::new(images);
    let next_index = Arc::new(AtomicUsize::new(0));

    let started_at = Utc::now();

    // Spawn worker threads
    let mut handles = Vec::new();

    for worker_id in 0..jobs {
        let images = Arc::clone(&images);
        let next_index = Arc::clone(&next_index);
        let results = Arc::clone(&results);
        let gate = Arc::clone(&gate);
        let pb = pb.clone();

        let handle = thread::spawn(move || loop {
            // Get next image to process (lock-free)
            let idx = next_index.fetch_add(1, Ordering::SeqCst);
            if idx >= images.len() {
                break;
            }

            let image = &images[idx];

            if verbose {
                let filename = image
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();
                pb.set_message(format!("[W{}] {}", worker_id, filename));
            }

            let outcome = load_image(image)
                .map_err(|e| e.to_string())
                .and_then(|frame| gate.process_frame(&frame, None).map_err(|e| e.to_string()));

            let entry = match outcome {
                Ok(outcome) => BatchEntry {
                    image_path: image.display().to_string(),
                    outcome: Some(outcome),
                    error: None,
                },
                Err(e) => {
                    warn!(image = %image.display(), error = %e, "batch item failed");
                    BatchEntry {
                        image_path: image.display().to_string(),
                        outcome: None,
                        error: Some(e),
                    }
                }
            };

            if let Ok(mut guard) = results.lock() {
                guard.push(entry);
            }

            pb.inc(1);
        });

        handles.push(handle);
    }

    // Wait for all workers to complete
    for handle in handles {
        let _ = handle.join();
    }

    pb.finish_with_message("Complete");

    let completed_at = Utc::now();

    let mut entries = match Arc::try_unwrap(results) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(shared) => shared
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default(),
    };

    // Sort entries by image path for consistent output
    entries.sort_by(|a, b| a.image_path.cmp(&b.image_path));

    let count = |pred: &dyn Fn(&GateOutcome) -> bool| {
        entries
            .iter()
            .filter(|e| e.outcome.as_ref().map(pred).unwrap_or(false))
            .count()
    };
    let granted = count(&|o| o.is_granted());
    let denied = count(&|o| o.report().is_some() && !o.is_granted());
    let manual_entry_required = count(&|o| matches!(o, GateOutcome::ManualEntryRequired { .. }));
    let no_plate_detected = count(&|o| matches!(o, GateOutcome::NoPlateDetected));
    let failed = entries.iter().filter(|e| e.error.is_some()).count();

    let results = BatchResults {
        entries,
        total_processed: total_images,
        granted,
        denied,
        manual_entry_required,
        no_plate_detected,
        failed,
        started_at,
        completed_at,
    };

    // Output results
    if let Some(output_path) = output {
        let content = serde_json::to_string_pretty(&results)?;
        std::fs::write(&output_path, content)?;
        println!("Results saved to: {}", output_path.display());
        return Ok(());
    }

    if output_format == OutputFormat::Json {
        return print_json(&results);
    }

    println!("\nBatch Complete");
    println!("==============");
    for entry in &results.entries {
        let status = match (&entry.outcome, &entry.error) {
            (Some(GateOutcome::Decided(report)), _) => format!(
                "{} {} ({})",
                if report.decision.granted { "GRANTED" } else { "DENIED " },
                report.plate,
                report.decision.reason
            ),
            (Some(GateOutcome::ManualEntryRequired { .. }), _) => "MANUAL  plate unreadable".to_string(),
            (Some(GateOutcome::NoPlateDetected), _) => "NOPLATE no plate detected".to_string(),
            (None, Some(e)) => format!("FAILED  {}", e),
            (None, None) => "FAILED".to_string(),
        };
        println!("{:<40} {}", entry.image_path, status);
    }
    println!();
    println!("Total:           {}", results.total_processed);
    println!("Granted:         {}", results.granted);
    println!("Denied:          {}", results.denied);
    println!("Manual entry:    {}", results.manual_entry_required);
    println!("No plate:        {}", results.no_plate_detected);
    println!("Failed:          {}", results.failed);
    println!(
        "Duration:        {:.1}s",
        (results.completed_at - results.started_at).num_milliseconds() as f64 / 1000.0
    );

    Ok(())
}

fn cmd_vehicle(config: &Config, action: VehicleAction, output_format: OutputFormat) -> Result<()> {
    let mut store = open_vehicle_store(config)?;

    match action {
        VehicleAction::Add {
            plate,
            color,
            make,
            owner,
        } => {
            let record = VehicleRecord::new(plate.trim())
                .with_color(color)
                .with_make_model(make)
                .with_owner(owner);
            let id = store.add_vehicle(record)?;
            println!("Registered vehicle {} ({})", plate.trim(), id);
        }

        VehicleAction::List => output_vehicles(output_format, store.all_vehicles())?,

        VehicleAction::Stats => output_stats(output_format, &store.stats())?,

        VehicleAction::Remove { target } => {
            let removed = store.remove_vehicle(&target)? || store.remove_by_plate(&target)?;
            if !removed {
                return Err(StoreError::NotFound(target).into());
            }
            println!("Removed {}", target);
        }

        VehicleAction::Import { file, dry_run } => {
            let records = open_registry_at(Some(file.clone()), config)?.fetch_vehicles()?;
            let mut imported = 0;
            let mut skipped = 0;

            for record in records {
                if dry_run {
                    println!(
                        "Would import: {} {} {} {}",
                        record.plate_number, record.color, record.make_model, record.owner_name
                    );
                    imported += 1;
                    continue;
                }
                let plate = record.plate_number.clone();
                match store.add_vehicle(record) {
                    Ok(_) => imported += 1,
                    Err(Error::Store(e)) => {
                        eprintln!("Skipped {}: {}", plate, e);
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            println!(
                "{} {} vehicle(s) from {} ({} skipped)",
                if dry_run { "Would import" } else { "Imported" },
                imported,
                file.display(),
                skipped
            );
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct VariantsOutput {
    original: String,
    variants: Vec<String>,
}

fn cmd_variants(plate: &str, output_format: OutputFormat) -> Result<()> {
    let set = expand_variants(&clean_detected_plate(plate));
    let output = VariantsOutput {
        original: set.original().to_string(),
        variants: set.iter().map(str::to_string).collect(),
    };

    if output_format == OutputFormat::Json {
        return print_json(&output);
    }

    println!("Plate: {} ({} variants)", output.original, output.variants.len());
    for variant in &output.variants {
        println!("  {}", variant);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SimilarityOutput<'a> {
    detected: &'a str,
    registered: &'a str,
    score: f64,
}

fn cmd_similarity(detected: &str, registered: &str, output_format: OutputFormat) -> Result<()> {
    let output = SimilarityOutput {
        detected,
        registered,
        score: similarity(detected, registered),
    };

    if output_format == OutputFormat::Json {
        return print_json(&output);
    }

    println!("{} vs {}: {:.4}", detected, registered, output.score);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    normalized: String,
    plausible: bool,
}

fn cmd_validate(text: &str, output_format: OutputFormat) -> Result<()> {
    let normalized = normalize_candidate(text);
    let output = ValidateOutput {
        plausible: is_plausible_plate(&normalized),
        normalized,
    };

    if output_format == OutputFormat::Json {
        return print_json(&output);
    }

    println!("Normalized: {}", output.normalized);
    println!("Plausible:  {}", if output.plausible { "Yes" } else { "No" });
    Ok(())
}

fn cmd_logs(
    config: &Config,
    limit: usize,
    filter: AttemptFilter,
    output_format: OutputFormat,
) -> Result<()> {
    let log = CsvAccessLog::new(config.access_log_path()?);
    let entries = log.recent_matching(limit, filter)?;
    output_access_log(output_format, &entries)
}

fn cmd_config(show: bool, set: Vec<String>, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    if !set.is_empty() {
        for assignment in &set {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: assignment.clone(),
                    value: "(expected KEY=VALUE)".to_string(),
                }
            })?;
            config.set(key.trim(), value.trim())?;
        }
        config.save()?;
        println!("Configuration updated");
    }

    if show || set.is_empty() {
        println!("{}", config);
        if !show {
            println!("Settable keys: {}", CONFIG_KEYS.join(", "));
        }
    }

    Ok(())
}
