//! Session persistence against the real file store: save, reload and
//! recompute must give the same results.

use std::env::temp_dir;
use std::fs;
use std::path::PathBuf;

use rt_core::session::{
    clear_session, load_state, restore_session, save_draft, save_state, FileStore, KeyValueStore,
    STORAGE_KEY,
};
use rt_core::{calculate, EngineConfig, FormField, InputSnapshot, LayerField, ShotField};

fn store_path(name: &str) -> PathBuf {
    temp_dir().join(format!("rt_core_session_{}.json", name))
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
    let _ = fs::remove_file(path.with_extension("lock"));
    let _ = fs::remove_file(path.with_extension("tmp"));
}

fn planned_job() -> InputSnapshot {
    let snapshot = InputSnapshot::default()
        .with_field(FormField::UnitSite, "Hydrocracker")
        .with_field(FormField::JobDate, "2026-10-16")
        .with_field(FormField::DrawingNumber, "HC-ISO-88")
        .with_field(FormField::Isotope, "Se-75")
        .with_field(FormField::FocusSpot, "0.12")
        .with_field(FormField::SourceActivity, "63.7")
        .with_field(FormField::TimePerExposure, "45")
        .with_field(FormField::ExposureTimeUnit, "seconds")
        .with_field(FormField::NumberOfExposures, "12")
        .with_field(FormField::ExposureDistance, "1.5")
        .with_field(FormField::TargetIntensity, "2.5");

    let (snapshot, steel) = snapshot.with_layer_added();
    let (snapshot, lead) = snapshot.with_layer_added();
    let (snapshot, shot) = snapshot.with_shot_added();
    snapshot
        .with_layer_field(steel, LayerField::Thickness, "0.322")
        .unwrap()
        .with_layer_field(steel, LayerField::HvlCount, "0.35")
        .unwrap()
        .with_layer_field(lead, LayerField::Material, "Lead")
        .unwrap()
        .with_layer_field(lead, LayerField::HvlCount, "1.1")
        .unwrap()
        .with_shot_field(shot, ShotField::Pdd, "6.625")
        .unwrap()
        .with_shot_field(shot, ShotField::Spd, "30")
        .unwrap()
}

#[test]
fn persisted_snapshot_recomputes_identically() {
    let path = store_path("roundtrip");
    cleanup(&path);

    let snapshot = planned_job();
    let mut store = FileStore::new(&path);
    save_state(&mut store, &snapshot).unwrap();

    let reopened = FileStore::new(&path);
    let loaded = load_state(&reopened);
    assert_eq!(loaded, snapshot);

    let config = EngineConfig::default();
    assert_eq!(calculate(&loaded, &config), calculate(&snapshot, &config));

    cleanup(&path);
}

#[test]
fn missing_store_file_starts_fresh() {
    let path = store_path("missing");
    cleanup(&path);

    let loaded = load_state(&FileStore::new(&path));
    assert_eq!(loaded, InputSnapshot::default());

    let fresh = loaded.with_starter_entries();
    assert_eq!(fresh.layers.len(), 1);
    assert_eq!(fresh.shots.len(), 1);
}

#[test]
fn malformed_state_falls_back_to_defaults() {
    let path = store_path("malformed");
    cleanup(&path);

    let mut store = FileStore::new(&path);
    store.set(STORAGE_KEY, "{\"layers\": [".to_string()).unwrap();
    assert_eq!(load_state(&store), InputSnapshot::default());

    // A corrupt store file is also survivable
    fs::write(&path, "not json at all").unwrap();
    assert_eq!(load_state(&FileStore::new(&path)), InputSnapshot::default());

    cleanup(&path);
}

#[test]
fn drafts_override_saved_state_on_restore() {
    let path = store_path("drafts");
    cleanup(&path);

    let mut store = FileStore::new(&path);
    save_state(&mut store, &planned_job()).unwrap();
    save_draft(&mut store, FormField::TargetIntensity, "3").unwrap();
    save_draft(&mut store, FormField::Cml, "CML-12").unwrap();

    let restored = restore_session(&FileStore::new(&path));
    assert_eq!(restored.target_intensity, Some(3.0));
    assert_eq!(restored.job.cml, "CML-12");
    assert_eq!(restored.layers.len(), 2);
    assert_eq!(restored.layers[1].material, rt_core::ShieldMaterial::Lead);

    clear_session(&mut store).unwrap();
    assert_eq!(load_state(&store), InputSnapshot::default());

    cleanup(&path);
}

