//! # Session Persistence
//!
//! Keeps form state alive between sessions through a flat key/value store:
//!
//! - **State**: the whole snapshot, layers and shots included, as one JSON
//!   document under [`STORAGE_KEY`]
//! - **Drafts**: raw per-field text keyed by field id under [`DRAFT_STORAGE_KEY`],
//!   restored over the state on load
//!
//! Persistence is best effort. Loading never fails: a missing, unreadable or
//! malformed entry is logged and the documented defaults are used instead.
//!
//! ## Stored Format
//!
//! Field values are stored as the raw text the form held, so a blank field
//! and a zero stay distinct:
//!
//! ```json
//! {
//!   "unitSite": "Unit 4",
//!   "isotope": "IR192",
//!   "focusSpot": "0.1",
//!   "timePerExposure": "10",
//!   "numberOfExposures": "3",
//!   "totalExposureMinutesOverride": "",
//!   "layers": [{ "id": "…", "material": "Lead", "thickness": "0.5", "hvlCount": "2" }],
//!   "shots": [{ "id": "…", "pdd": "4", "spd": "20" }]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rt_core::session::{load_state, save_state, MemoryStore};
//! use rt_core::snapshot::{FormField, InputSnapshot};
//!
//! let mut store = MemoryStore::default();
//! let snapshot = InputSnapshot::default().with_field(FormField::SourceActivity, "100");
//!
//! save_state(&mut store, &snapshot)?;
//! assert_eq!(load_state(&store), snapshot);
//! # Ok::<(), rt_core::errors::RtError>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{RtError, RtResult};
use crate::isotope::{Isotope, ShieldMaterial, TimeUnit};
use crate::snapshot::{
    format_number, parse_number, FormField, InputSnapshot, JobInfo, MaterialLayer, ShotCard,
    DEFAULT_TARGET_INTENSITY,
};

#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

/// Storage key for the persisted snapshot
pub const STORAGE_KEY: &str = "rt-shot-safety-v2-state";

/// Storage key for raw per-field drafts
pub const DRAFT_STORAGE_KEY: &str = "rt-shot-safety-v2-drafts";

/// A flat string key/value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RtResult<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> RtResult<()>;

    fn remove(&mut self, key: &str) -> RtResult<()>;
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RtResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> RtResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RtResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Stored representation
// ============================================================================

/// A stored field: text normally, but older states held bare numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Text(String),
    Number(f64),
    Other(Value),
}

impl StoredValue {
    fn text(&self) -> String {
        match self {
            StoredValue::Text(s) => s.clone(),
            StoredValue::Number(n) => n.to_string(),
            StoredValue::Other(_) => String::new(),
        }
    }

    fn number(&self) -> Option<f64> {
        parse_number(&self.text())
    }
}

fn text(value: &Option<StoredValue>) -> String {
    value.as_ref().map(StoredValue::text).unwrap_or_default()
}

fn number(value: &Option<StoredValue>) -> Option<f64> {
    value.as_ref().and_then(StoredValue::number)
}

fn stored(text: String) -> Option<StoredValue> {
    Some(StoredValue::Text(text))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredState {
    unit_site: Option<StoredValue>,
    job_date: Option<StoredValue>,
    drawing_number: Option<StoredValue>,
    cml: Option<StoredValue>,
    isotope: Option<StoredValue>,
    focus_spot: Option<StoredValue>,
    source_activity: Option<StoredValue>,
    exposure_time_unit: Option<StoredValue>,
    time_per_exposure: Option<StoredValue>,
    number_of_exposures: Option<StoredValue>,
    total_exposure_minutes_override: Option<StoredValue>,
    layers: Option<Value>,
    shots: Option<Value>,
    exposure_distance: Option<StoredValue>,
    target_intensity: Option<StoredValue>,

    // Keys written by the first release of the form
    #[serde(skip_serializing_if = "Option::is_none")]
    minutes_per_exposure: Option<StoredValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds_per_exposure: Option<StoredValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exposures_per_hour: Option<StoredValue>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredLayer {
    id: Option<String>,
    material: Option<String>,
    thickness: Option<StoredValue>,
    hvl_count: Option<StoredValue>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredShot {
    id: Option<String>,
    pdd: Option<StoredValue>,
    spd: Option<StoredValue>,
}

/// Stored ids that are missing or unparsable get a fresh one.
fn entry_id(id: &Option<String>) -> Uuid {
    id.as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Decode each array element on its own, dropping the ones that don't fit.
fn entries<T: for<'de> Deserialize<'de>>(value: &Option<Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

impl From<&InputSnapshot> for StoredState {
    fn from(snapshot: &InputSnapshot) -> Self {
        let layers = snapshot
            .layers
            .iter()
            .map(|layer| StoredLayer {
                id: Some(layer.id.to_string()),
                material: Some(layer.material.name().to_string()),
                thickness: stored(layer.thickness_in.to_string()),
                hvl_count: stored(layer.hvl_count.to_string()),
            })
            .collect::<Vec<_>>();
        let shots = snapshot
            .shots
            .iter()
            .map(|shot| StoredShot {
                id: Some(shot.id.to_string()),
                pdd: stored(shot.pdd_in.to_string()),
                spd: stored(shot.spd_in.to_string()),
            })
            .collect::<Vec<_>>();

        StoredState {
            unit_site: stored(snapshot.job.unit_site.clone()),
            job_date: stored(snapshot.job.job_date.clone()),
            drawing_number: stored(snapshot.job.drawing_number.clone()),
            cml: stored(snapshot.job.cml.clone()),
            isotope: stored(snapshot.isotope.code().to_string()),
            focus_spot: stored(format_number(snapshot.focus_spot_in)),
            source_activity: stored(format_number(snapshot.source_activity_ci)),
            exposure_time_unit: stored(snapshot.exposure_time_unit.code().to_string()),
            time_per_exposure: stored(format_number(snapshot.time_per_exposure)),
            number_of_exposures: stored(format_number(snapshot.number_of_exposures)),
            total_exposure_minutes_override: stored(format_number(
                snapshot.total_exposure_minutes_override,
            )),
            layers: serde_json::to_value(layers).ok(),
            shots: serde_json::to_value(shots).ok(),
            exposure_distance: stored(format_number(snapshot.exposure_distance_ft)),
            target_intensity: stored(format_number(snapshot.target_intensity)),
            minutes_per_exposure: None,
            seconds_per_exposure: None,
            exposures_per_hour: None,
        }
    }
}

impl StoredState {
    /// Rebuild a snapshot. Absent keys take the defaults; present keys are
    /// used as stored, zeros included.
    fn into_snapshot(self) -> InputSnapshot {
        let defaults = InputSnapshot::default();

        let time_per_exposure = match &self.time_per_exposure {
            Some(value) => value.number(),
            None => number(&self.minutes_per_exposure)
                .or_else(|| number(&self.seconds_per_exposure).map(|secs| secs / 60.0)),
        };

        let number_of_exposures = match &self.number_of_exposures {
            Some(value) => value.number(),
            None => number(&self.exposures_per_hour).or(defaults.number_of_exposures),
        };

        let layers = entries::<StoredLayer>(&self.layers)
            .into_iter()
            .map(|layer| MaterialLayer {
                id: entry_id(&layer.id),
                material: layer
                    .material
                    .as_deref()
                    .and_then(ShieldMaterial::from_name)
                    .unwrap_or_default(),
                thickness_in: number(&layer.thickness).unwrap_or(0.0),
                hvl_count: number(&layer.hvl_count).unwrap_or(0.0),
            })
            .collect();

        let shots = entries::<StoredShot>(&self.shots)
            .into_iter()
            .map(|shot| ShotCard {
                id: entry_id(&shot.id),
                pdd_in: number(&shot.pdd).unwrap_or(0.0),
                spd_in: number(&shot.spd).unwrap_or(0.0),
            })
            .collect();

        InputSnapshot {
            job: JobInfo {
                unit_site: text(&self.unit_site),
                job_date: text(&self.job_date),
                drawing_number: text(&self.drawing_number),
                cml: text(&self.cml),
            },
            isotope: self
                .isotope
                .as_ref()
                .map(|v| Isotope::from_code(&v.text()))
                .unwrap_or(defaults.isotope),
            focus_spot_in: number(&self.focus_spot),
            source_activity_ci: number(&self.source_activity),
            exposure_time_unit: self
                .exposure_time_unit
                .as_ref()
                .map(|v| TimeUnit::from_code(&v.text()))
                .unwrap_or(defaults.exposure_time_unit),
            time_per_exposure,
            number_of_exposures,
            total_exposure_minutes_override: number(&self.total_exposure_minutes_override),
            layers,
            shots,
            exposure_distance_ft: match &self.exposure_distance {
                Some(value) => value.number(),
                None => defaults.exposure_distance_ft,
            },
            target_intensity: match &self.target_intensity {
                Some(value) => value.number(),
                None => Some(DEFAULT_TARGET_INTENSITY),
            },
        }
    }
}

// ============================================================================
// State and drafts
// ============================================================================

/// Persist the snapshot under [`STORAGE_KEY`].
pub fn save_state(store: &mut impl KeyValueStore, snapshot: &InputSnapshot) -> RtResult<()> {
    let json = serde_json::to_string(&StoredState::from(snapshot)).map_err(RtError::serialization)?;
    store.set(STORAGE_KEY, json)?;
    tracing::info!(
        layers = snapshot.layers.len(),
        shots = snapshot.shots.len(),
        "saved session state"
    );
    Ok(())
}

/// Decode a stored state document. Exposed for callers that hold the raw text.
pub fn decode_state(raw: &str) -> RtResult<InputSnapshot> {
    let state: StoredState = serde_json::from_str(raw).map_err(RtError::serialization)?;
    Ok(state.into_snapshot())
}

/// Load the persisted snapshot, falling back to defaults on any problem.
pub fn load_state(store: &impl KeyValueStore) -> InputSnapshot {
    let raw = match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return InputSnapshot::default(),
        Err(e) => {
            tracing::warn!("session store unreadable, using defaults: {}", e);
            return InputSnapshot::default();
        }
    };

    decode_state(&raw).unwrap_or_else(|e| {
        tracing::warn!("discarding malformed session state: {}", e);
        InputSnapshot::default()
    })
}

/// Remove persisted state and drafts.
pub fn clear_session(store: &mut impl KeyValueStore) -> RtResult<()> {
    store.remove(STORAGE_KEY)?;
    store.remove(DRAFT_STORAGE_KEY)
}

/// Stored drafts, keyed by field id.
fn read_draft_map(store: &impl KeyValueStore) -> BTreeMap<String, String> {
    match store.get(DRAFT_STORAGE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("discarding malformed field drafts: {}", e);
            BTreeMap::new()
        }),
        Ok(None) => BTreeMap::new(),
        Err(e) => {
            tracing::warn!("draft store unreadable: {}", e);
            BTreeMap::new()
        }
    }
}

fn write_draft_map(
    store: &mut impl KeyValueStore,
    drafts: &BTreeMap<String, String>,
) -> RtResult<()> {
    let json = serde_json::to_string(drafts).map_err(RtError::serialization)?;
    store.set(DRAFT_STORAGE_KEY, json)
}

/// Record the raw text of one field under [`DRAFT_STORAGE_KEY`].
pub fn save_draft(store: &mut impl KeyValueStore, field: FormField, raw: &str) -> RtResult<()> {
    let mut drafts = read_draft_map(store);
    drafts.insert(field.id().to_string(), raw.to_string());
    write_draft_map(store, &drafts)
}

/// Drop the draft for one field once its value is committed to state.
pub fn discard_draft(store: &mut impl KeyValueStore, field: FormField) -> RtResult<()> {
    let mut drafts = read_draft_map(store);
    if drafts.remove(field.id()).is_none() {
        return Ok(());
    }
    write_draft_map(store, &drafts)
}

/// Load drafts for known fields. Unknown ids are skipped.
pub fn load_drafts(store: &impl KeyValueStore) -> BTreeMap<FormField, String> {
    read_draft_map(store)
        .into_iter()
        .filter_map(|(id, raw)| id.parse::<FormField>().ok().map(|field| (field, raw)))
        .collect()
}

/// Lay drafts over a snapshot, one field at a time.
pub fn apply_drafts(
    snapshot: &InputSnapshot,
    drafts: &BTreeMap<FormField, String>,
) -> InputSnapshot {
    drafts
        .iter()
        .fold(snapshot.clone(), |next, (field, raw)| next.with_field(*field, raw))
}

/// Load state and restore drafts over it: what the form shows on open.
pub fn restore_session(store: &impl KeyValueStore) -> InputSnapshot {
    apply_drafts(&load_state(store), &load_drafts(store))
}

// ============================================================================
// File-backed store
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod file_store {
    use std::collections::BTreeMap;
    use std::fs::{self, File, OpenOptions};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use fs2::FileExt;

    use super::KeyValueStore;
    use crate::errors::{RtError, RtResult};

    /// Key/value store backed by one JSON object on disk.
    ///
    /// Writes go to a `.tmp` file that is synced and renamed over the store,
    /// while an exclusive lock is held on a `.lock` sidecar.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            FileStore { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_all(&self) -> RtResult<BTreeMap<String, String>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }
            let contents = fs::read_to_string(&self.path).map_err(|e| {
                RtError::file_error("read store", self.path.display().to_string(), e.to_string())
            })?;
            if contents.trim().is_empty() {
                return Ok(BTreeMap::new());
            }
            serde_json::from_str(&contents).map_err(|e| RtError::SerializationError {
                reason: format!("Invalid store in {}: {}", self.path.display(), e),
            })
        }

        /// Read-modify-write under the lock.
        fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> RtResult<()> {
            let lock_path = self.path.with_extension("lock");
            let lock_file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|e| {
                    RtError::file_error(
                        "create lock",
                        lock_path.display().to_string(),
                        e.to_string(),
                    )
                })?;
            lock_file.try_lock_exclusive().map_err(|_| RtError::FileLocked {
                path: self.path.display().to_string(),
            })?;

            // A corrupt store is replaced rather than blocking every later save
            let mut entries = self.read_all().unwrap_or_else(|e| {
                tracing::warn!("rewriting unreadable store: {}", e);
                BTreeMap::new()
            });
            change(&mut entries);
            let result = self.write_all(&entries);

            let _ = FileExt::unlock(&lock_file);
            result
        }

        fn write_all(&self, entries: &BTreeMap<String, String>) -> RtResult<()> {
            let json = serde_json::to_string_pretty(entries).map_err(RtError::serialization)?;
            let tmp_path = self.path.with_extension("tmp");

            let mut tmp_file = File::create(&tmp_path).map_err(|e| {
                RtError::file_error(
                    "create temp file",
                    tmp_path.display().to_string(),
                    e.to_string(),
                )
            })?;
            tmp_file.write_all(json.as_bytes()).map_err(|e| {
                RtError::file_error(
                    "write temp file",
                    tmp_path.display().to_string(),
                    e.to_string(),
                )
            })?;
            tmp_file.sync_all().map_err(|e| {
                RtError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
            })?;

            fs::rename(&tmp_path, &self.path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                RtError::file_error(
                    "rename to final",
                    self.path.display().to_string(),
                    e.to_string(),
                )
            })
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> RtResult<Option<String>> {
            Ok(self.read_all()?.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: String) -> RtResult<()> {
            self.update(|entries| {
                entries.insert(key.to_string(), value);
            })
        }

        fn remove(&mut self, key: &str) -> RtResult<()> {
            self.update(|entries| {
                entries.remove(key);
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::env::temp_dir;

        fn temp_store_path(name: &str) -> PathBuf {
            temp_dir().join(format!("rt_core_test_{}.json", name))
        }

        #[test]
        fn test_set_get_remove() {
            let path = temp_store_path("kv");
            let _ = fs::remove_file(&path);
            let mut store = FileStore::new(&path);

            assert_eq!(store.get("a").unwrap(), None);
            store.set("a", "1".to_string()).unwrap();
            store.set("b", "2".to_string()).unwrap();
            assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

            // A second handle sees the same data
            let other = FileStore::new(&path);
            assert_eq!(other.get("b").unwrap(), Some("2".to_string()));

            store.remove("a").unwrap();
            assert_eq!(store.get("a").unwrap(), None);

            assert!(!path.with_extension("tmp").exists());

            let _ = fs::remove_file(&path);
            let _ = fs::remove_file(path.with_extension("lock"));
        }

        #[test]
        fn test_corrupt_store_reads_as_error_and_is_replaced_on_write() {
            let path = temp_store_path("corrupt");
            fs::write(&path, "{not json").unwrap();
            let mut store = FileStore::new(&path);

            assert!(store.get("a").is_err());
            store.set("a", "1".to_string()).unwrap();
            assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

            let _ = fs::remove_file(&path);
            let _ = fs::remove_file(path.with_extension("lock"));
        }
    }
}
