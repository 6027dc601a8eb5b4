//! Command implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rt_core::calculations::Severity;
use rt_core::report::{render_report_pdf, render_report_text, REPORT_FILE_NAME};
use rt_core::session::{
    clear_session, discard_draft, restore_session, save_draft, save_state, FileStore,
};
use rt_core::{calculate, CalculationResult, EngineConfig, FormField, InputSnapshot, Isotope};

use crate::cli::{CalcArgs, EngineArgs, ReportArgs, StateAction, StateArgs};

/// Engine config from the optional file, with flag overrides applied.
pub fn engine_config(args: &EngineArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(count) = args.collimator_hvl {
        config.include_collimator_hvl = true;
        config.collimator_hvl_count = count;
    }
    if args.check_blow_up {
        config.check_blow_up = true;
    }
    if args.no_multiplier {
        config.use_multiplier_heuristic = false;
    }

    tracing::debug!(?config, "engine config");
    Ok(config)
}

fn read_snapshot(path: &Path) -> Result<InputSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid snapshot in {}", path.display()))
}

pub fn run_calc(args: &CalcArgs, config: &EngineConfig) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let result = calculate(&snapshot, config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_results(&result);
    }
    Ok(())
}

pub fn run_report(args: &ReportArgs, config: &EngineConfig) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let result = calculate(&snapshot, config);

    if args.text {
        println!("{}", render_report_text(&snapshot, &result));
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| REPORT_FILE_NAME.into());
    let pdf = render_report_pdf(&snapshot, &result)?;
    fs::write(&output, pdf).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Report written to {}", output.display());
    Ok(())
}

pub fn run_state(args: &StateArgs, config: &EngineConfig) -> Result<()> {
    let mut store = FileStore::new(&args.store);
    let snapshot = restore_session(&store).with_starter_entries();

    let updated = match &args.action {
        StateAction::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
                println!();
                print_results(&calculate(&snapshot, config));
            }
            return Ok(());
        }
        StateAction::Reset => {
            let path = store.path().display().to_string();
            clear_session(&mut store)
                .with_context(|| format!("failed to clear session in {}", path))?;
            println!("Session cleared.");
            return Ok(());
        }
        StateAction::Draft { field, value } => {
            let path = store.path().display().to_string();
            save_draft(&mut store, *field, value)
                .with_context(|| format!("failed to save draft to {}", path))?;
            println!("Draft saved for {}.", field);
            return Ok(());
        }
        StateAction::Set { field, value } => snapshot.with_field(*field, value),
        StateAction::AddLayer => {
            let (next, id) = snapshot.with_layer_added();
            println!("Added layer {}", id);
            next
        }
        StateAction::EditLayer { id, field, value } => {
            snapshot.with_layer_field(*id, *field, value)?
        }
        StateAction::RemoveLayer { id } => snapshot.with_layer_removed(*id),
        StateAction::AddShot => {
            let (next, id) = snapshot.with_shot_added();
            println!("Added shot {}", id);
            next
        }
        StateAction::EditShot { id, field, value } => {
            snapshot.with_shot_field(*id, *field, value)?
        }
        StateAction::RemoveShot { id } => snapshot.with_shot_removed(*id),
    };

    save_state(&mut store, &updated)
        .with_context(|| format!("failed to save session to {}", store.path().display()))?;
    // A committed field no longer has a pending draft
    if let StateAction::Set { field, .. } = &args.action {
        discard_draft(&mut store, *field)
            .with_context(|| format!("failed to update drafts in {}", store.path().display()))?;
    }
    print_results(&calculate(&updated, config));
    Ok(())
}

pub fn run_isotopes() {
    println!("{:<8} {:<16} {:>10}", "Code", "Name", "Constant");
    for isotope in Isotope::ALL {
        println!(
            "{:<8} {:<16} {:>10}",
            isotope.code(),
            isotope.display_name(),
            isotope.constant()
        );
    }
    println!();
    println!("Constants are mR/hr per Ci at 1 ft.");
}

fn print_snapshot(snapshot: &InputSnapshot) {
    println!("Form Fields");
    for field in FormField::ALL {
        println!("  {:<30} {}", field.id(), snapshot.field_value(field));
    }

    println!("Material Layers");
    for (index, layer) in snapshot.layers.iter().enumerate() {
        println!(
            "  {}. {}  {}  thickness {} in  HVL {}",
            index + 1,
            layer.id,
            layer.material,
            layer.thickness_in,
            layer.hvl_count
        );
    }

    println!("Shot Cards");
    for (index, shot) in snapshot.shots.iter().enumerate() {
        println!(
            "  {}. {}  PDD {} in  SPD {} in",
            index + 1,
            shot.id,
            shot.pdd_in,
            shot.spd_in
        );
    }
}

fn print_results(result: &CalculationResult) {
    println!("Isotope constant:          {}", result.isotope_constant);
    println!("Beam minutes per hour:     {:.1}", result.beam_minutes_per_hour);
    println!("Time fraction:             {:.4}", result.time_fraction);
    match result.max_dose_at_public_mr_hr {
        Some(dose) => println!("Max dose at public:        {:.1} mR/hr", dose),
        None => println!("Max dose at public:        -"),
    }
    println!("Attenuation factor:        {:.6}", result.attenuation_factor);
    println!("2 mR/hr boundary:          {:.1} ft", result.boundary_public_ft);
    println!("100 mR/hr boundary:        {:.1} ft", result.boundary_radiation_area_ft);
    println!("Distance without shielding: {:.1} ft", result.distance_without_shielding_ft);
    println!("Distance with shielding:   {:.1} ft", result.distance_with_shielding_ft);
    println!("Emergency distance:        {:.1} ft", result.emergency_distance_ft);
    println!("Exposure time:             {:.1} minutes", result.exposure_minutes);

    for (index, shot) in result.shots.iter().enumerate() {
        println!();
        println!("Shot {}", index + 1);
        if !shot.is_complete() {
            println!("  Incomplete geometry: enter focal spot, PDD and SPD.");
        }
        println!(
            "  UG {:.4} | Mag {:.4} | Blow-up {:.1}% | {}",
            shot.ug,
            shot.magnification,
            shot.blow_up_percent,
            shot.ug_status.label()
        );
        if let Some(status) = shot.blow_up_status {
            println!("  Blow-up check: {}", status.label());
        }
        println!("  Required SPD: {:.3} in", shot.required_spd_final);
        if let Some(rec) = &shot.recommendation {
            if rec.required_multiplier > 0 {
                println!(
                    "  Field recommendation: {}x, SPD {:.3} in, UG {:.4}",
                    rec.required_multiplier, rec.recommended_spd_in, rec.ug_at_recommended
                );
            }
        }
    }

    if !result.shots.is_empty() {
        println!();
        let overall = if result.all_shots_pass() { "PASS" } else { "FAIL" };
        println!("All shots: {}", overall);
    }

    println!();
    for warning in &result.warnings {
        let marker = match warning.severity {
            Severity::Info => "ok",
            Severity::Caution => "!",
            Severity::Critical => "!!",
        };
        println!("[{}] {}", marker, warning.message);
    }
}
