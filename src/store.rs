//! Key-value state for a running board: the current generation plus the
//! scalar settings and counters that go with it.

use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs, io,
    path::{Path, PathBuf},
};

use bevy::log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{grid::Grid, prelude::*};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("state file {path:?} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode state file {path:?}: {source}")]
    EncodeFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode {key}: {source}")]
    Encode {
        key: StateKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot decode {key}: {source}")]
    Decode {
        key: StateKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} is derived from the current generation and cannot be set")]
    Derived(StateKey),
    #[error("grid size must be at least 1")]
    InvalidGridSize,
}

/// Names under which state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    CurrentGeneration,
    GridSize,
    TickInterval,
    ActivityStatus,
    RandomLifeStatus,
    GenerationCount,
    LiveCellCount,
}

impl StateKey {
    pub const ALL: [StateKey; 7] = [
        StateKey::CurrentGeneration,
        StateKey::GridSize,
        StateKey::TickInterval,
        StateKey::ActivityStatus,
        StateKey::RandomLifeStatus,
        StateKey::GenerationCount,
        StateKey::LiveCellCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::CurrentGeneration => "currentGeneration",
            StateKey::GridSize => "gridSize",
            StateKey::TickInterval => "tickInterval",
            StateKey::ActivityStatus => "activityStatus",
            StateKey::RandomLifeStatus => "randomLifeStatus",
            StateKey::GenerationCount => "currentGenerationCount",
            StateKey::LiveCellCount => "liveCellCount",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-valued flag used for the activity and random-life settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    #[default]
    Inactive,
}

impl Status {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }
}

impl From<bool> for Status {
    fn from(active: bool) -> Self {
        if active {
            Status::Active
        } else {
            Status::Inactive
        }
    }
}

/// Raw text storage behind a [`StateStore`].
pub trait StateBackend: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;

    /// Writes every entry or, on error, none of them.
    fn write_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StoreError>;

    fn write(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.write_all(vec![(key, value)])
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StoreError> {
        self.entries
            .extend(entries.into_iter().map(|(key, value)| (key.to_owned(), value)));
        Ok(())
    }
}

/// Keeps every entry in one JSON object on disk, rewritten on each write.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileBackend {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!("opened state file {:?} with {} entries", path, entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StoreError> {
        // entries only change once the file is on disk
        let mut next = self.entries.clone();
        next.extend(entries.into_iter().map(|(key, value)| (key.to_owned(), value)));
        let text = serde_json::to_string_pretty(&next).map_err(|source| StoreError::EncodeFile {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.entries = next;
        Ok(())
    }
}

/// Typed access to board state. Values are kept as JSON text in a
/// [`StateBackend`]; the live-cell count is rewritten with every grid write.
pub struct StateStore {
    backend: Box<dyn StateBackend>,
}

impl StateStore {
    pub fn new(backend: impl StateBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.backend.read(key.as_str()).is_some()
    }

    pub fn get<T: DeserializeOwned>(&self, key: StateKey) -> Result<Option<T>, StoreError> {
        self.backend
            .read(key.as_str())
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(|source| StoreError::Decode { key, source })
    }

    /// Writes `value` under `key`. A grid written under
    /// [`StateKey::CurrentGeneration`] goes through
    /// [`set_current_generation`](Self::set_current_generation).
    pub fn set<T: Serialize>(&mut self, key: StateKey, value: &T) -> Result<(), StoreError> {
        match key {
            StateKey::LiveCellCount => Err(StoreError::Derived(key)),
            StateKey::CurrentGeneration => {
                let value =
                    serde_json::to_value(value).map_err(|source| StoreError::Encode { key, source })?;
                let grid: Grid =
                    serde_json::from_value(value).map_err(|source| StoreError::Decode { key, source })?;
                self.set_current_generation(&grid).map(|_| ())
            }
            StateKey::GridSize => {
                let value =
                    serde_json::to_value(value).map_err(|source| StoreError::Encode { key, source })?;
                let size: usize =
                    serde_json::from_value(value).map_err(|source| StoreError::Decode { key, source })?;
                self.set_grid_size(size)
            }
            _ => self.write_raw(key, value),
        }
    }

    fn encode<T: Serialize + ?Sized>(key: StateKey, value: &T) -> Result<String, StoreError> {
        serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })
    }

    fn write_raw<T: Serialize + ?Sized>(&mut self, key: StateKey, value: &T) -> Result<(), StoreError> {
        let text = Self::encode(key, value)?;
        self.backend.write(key.as_str(), text)
    }

    fn get_or<T: DeserializeOwned>(&self, key: StateKey, default: T) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!("{err}, using default");
                default
            }
        }
    }

    // ——> current generation

    /// The stored generation, or an empty grid of [`grid_size`](Self::grid_size)
    /// when none is stored or it cannot be decoded.
    pub fn current_generation(&self) -> Grid {
        match self.get::<Grid>(StateKey::CurrentGeneration) {
            Ok(Some(grid)) => grid,
            Ok(None) => Grid::empty(self.grid_size()),
            Err(err) => {
                warn!("{err}, using an empty grid");
                Grid::empty(self.grid_size())
            }
        }
    }

    /// Stores `grid` together with its live-cell count, and its size when it
    /// differs from the stored one, in a single backend write. Returns the
    /// live count.
    pub fn set_current_generation(&mut self, grid: &Grid) -> Result<usize, StoreError> {
        let live = grid.live_count();
        let mut entries = vec![
            (
                StateKey::CurrentGeneration.as_str(),
                Self::encode(StateKey::CurrentGeneration, grid)?,
            ),
            (
                StateKey::LiveCellCount.as_str(),
                Self::encode(StateKey::LiveCellCount, &live)?,
            ),
        ];
        if self.grid_size() != grid.size() {
            entries.push((
                StateKey::GridSize.as_str(),
                Self::encode(StateKey::GridSize, &grid.size())?,
            ));
        }
        self.backend.write_all(entries)?;
        Ok(live)
    }

    /// Resizes the stored generation in place. Counters are left alone.
    pub fn resize_grid(&mut self, new_size: usize) -> Result<(), StoreError> {
        if new_size == 0 {
            return Err(StoreError::InvalidGridSize);
        }
        let resized = self.current_generation().resized(new_size);
        self.set_current_generation(&resized)?;
        Ok(())
    }

    // ——> scalars

    pub fn grid_size(&self) -> usize {
        match self.get_or(StateKey::GridSize, DEFAULT_GRID_SIZE) {
            0 => DEFAULT_GRID_SIZE,
            size => size,
        }
    }

    /// Records the grid size used for the next reset. A stored generation of
    /// another size is resized to match.
    pub fn set_grid_size(&mut self, size: usize) -> Result<(), StoreError> {
        if size == 0 {
            return Err(StoreError::InvalidGridSize);
        }
        if self.contains(StateKey::CurrentGeneration) && self.current_generation().size() != size {
            return self.resize_grid(size);
        }
        self.write_raw(StateKey::GridSize, &size)
    }

    /// Milliseconds between ticks.
    pub fn tick_interval(&self) -> u64 {
        self.get_or(StateKey::TickInterval, DEFAULT_TICK_INTERVAL_MS)
    }

    pub fn set_tick_interval(&mut self, interval_ms: u64) -> Result<(), StoreError> {
        self.write_raw(StateKey::TickInterval, &interval_ms)
    }

    pub fn activity(&self) -> Status {
        self.get_or(StateKey::ActivityStatus, Status::Inactive)
    }

    pub fn set_activity(&mut self, status: Status) -> Result<(), StoreError> {
        self.write_raw(StateKey::ActivityStatus, &status)
    }

    pub fn random_life(&self) -> Status {
        self.get_or(StateKey::RandomLifeStatus, Status::Inactive)
    }

    pub fn set_random_life(&mut self, status: Status) -> Result<(), StoreError> {
        self.write_raw(StateKey::RandomLifeStatus, &status)
    }

    pub fn live_cell_count(&self) -> usize {
        self.get_or(StateKey::LiveCellCount, 0)
    }

    // ——> generation counter

    pub fn generation_count(&self) -> u64 {
        self.get_or(StateKey::GenerationCount, 0)
    }

    pub fn increment_generation_count(&mut self) -> Result<u64, StoreError> {
        let count = self.generation_count() + 1;
        self.write_raw(StateKey::GenerationCount, &count)?;
        Ok(count)
    }

    pub fn reset_generation_count(&mut self) -> Result<(), StoreError> {
        self.write_raw(StateKey::GenerationCount, &0u64)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("grid_size", &self.grid_size())
            .field("generation", &self.generation_count())
            .field("live_cells", &self.live_cell_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pattern::Pattern;

    #[test]
    fn empty_store_uses_defaults() {
        let store = StateStore::in_memory();
        assert_eq!(store.grid_size(), DEFAULT_GRID_SIZE);
        assert_eq!(store.tick_interval(), DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(store.activity(), Status::Inactive);
        assert_eq!(store.random_life(), Status::Inactive);
        assert_eq!(store.generation_count(), 0);
        assert_eq!(store.live_cell_count(), 0);
        assert_eq!(store.current_generation(), Grid::empty(DEFAULT_GRID_SIZE));
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let mut backend = MemoryBackend::default();
        backend.write("tickInterval", "fast".into()).unwrap();
        backend.write("gridSize", "0".into()).unwrap();
        backend.write("currentGeneration", "[[1,0]]".into()).unwrap();
        let store = StateStore::new(backend);
        assert_eq!(store.tick_interval(), DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(store.grid_size(), DEFAULT_GRID_SIZE);
        assert_eq!(store.current_generation(), Grid::empty(DEFAULT_GRID_SIZE));
        assert!(store.get::<u64>(StateKey::TickInterval).is_err());
    }

    #[test]
    fn grid_write_recomputes_live_count() {
        let mut store = StateStore::in_memory();
        let grid = Pattern::Exploder.seed(20);
        assert_eq!(store.set_current_generation(&grid).unwrap(), 12);
        assert_eq!(store.live_cell_count(), 12);
        assert_eq!(store.current_generation(), grid);

        let mut toggled = grid.clone();
        toggled.toggle(0, 0).unwrap();
        store.set(StateKey::CurrentGeneration, &toggled).unwrap();
        assert_eq!(store.live_cell_count(), 13);
        assert_eq!(store.current_generation(), toggled);
    }

    #[test]
    fn generic_set_validates_grids_and_rejects_live_count() {
        let mut store = StateStore::in_memory();
        let err = store
            .set(StateKey::CurrentGeneration, &vec![vec![1u8, 0], vec![0]])
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
        let err = store.set(StateKey::LiveCellCount, &3usize).unwrap_err();
        assert!(matches!(err, StoreError::Derived(StateKey::LiveCellCount)));

        store.set(StateKey::TickInterval, &75u64).unwrap();
        assert_eq!(store.get::<u64>(StateKey::TickInterval).unwrap(), Some(75));
        store.set(StateKey::RandomLifeStatus, &Status::Active).unwrap();
        assert_eq!(store.random_life(), Status::Active);
    }

    #[test]
    fn status_is_stored_as_lowercase_text() {
        let mut backend = MemoryBackend::default();
        backend.write("activityStatus", "\"active\"".into()).unwrap();
        let mut store = StateStore::new(backend);
        assert_eq!(store.activity(), Status::Active);
        store.set_activity(Status::Inactive).unwrap();
        assert_eq!(
            store.get::<String>(StateKey::ActivityStatus).unwrap().as_deref(),
            Some("inactive")
        );
    }

    #[test]
    fn grid_of_new_size_updates_grid_size() {
        let mut store = StateStore::in_memory();
        store.set_current_generation(&Grid::empty(10)).unwrap();
        assert_eq!(store.grid_size(), 10);
    }

    #[test]
    fn resize_keeps_counters() {
        let mut store = StateStore::in_memory();
        store.set_current_generation(&Pattern::Block.seed(20)).unwrap();
        store.increment_generation_count().unwrap();
        store.increment_generation_count().unwrap();

        store.resize_grid(50).unwrap();
        assert_eq!(store.grid_size(), 50);
        assert_eq!(store.generation_count(), 2);
        assert_eq!(store.current_generation(), Pattern::Block.seed(20).resized(50));
        assert_eq!(store.live_cell_count(), 4);

        // the block sits at (9, 9)..(10, 10), half of it survives a shrink to 10
        store.resize_grid(10).unwrap();
        assert_eq!(store.live_cell_count(), 1);
        assert!(store.current_generation().is_alive(9, 9));

        assert!(matches!(store.resize_grid(0), Err(StoreError::InvalidGridSize)));
    }

    #[test]
    fn failed_file_write_keeps_grid_and_count_together() {
        let path = std::env::temp_dir()
            .join(format!("torus-life-missing-{}", std::process::id()))
            .join("state.json");
        let mut store = StateStore::new(FileBackend::open(&path).unwrap());

        let err = store.set_current_generation(&Pattern::Glider.seed(20)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.live_cell_count(), store.current_generation().live_count());
        assert_eq!(store.current_generation(), Grid::empty(DEFAULT_GRID_SIZE));
        assert!(!store.contains(StateKey::CurrentGeneration));

        assert!(store.resize_grid(10).is_err());
        assert_eq!(store.grid_size(), DEFAULT_GRID_SIZE);
    }

    #[test]
    fn memory_batch_write_lands_every_entry() {
        let mut backend = MemoryBackend::default();
        backend
            .write_all(vec![("gridSize", "10".into()), ("liveCellCount", "0".into())])
            .unwrap();
        assert_eq!(backend.read("gridSize").as_deref(), Some("10"));
        assert_eq!(backend.read("liveCellCount").as_deref(), Some("0"));
    }

    #[test]
    fn counters_increment_and_reset() {
        let mut store = StateStore::in_memory();
        assert_eq!(store.increment_generation_count().unwrap(), 1);
        assert_eq!(store.increment_generation_count().unwrap(), 2);
        store.reset_generation_count().unwrap();
        assert_eq!(store.generation_count(), 0);
    }

    #[test]
    fn file_backend_persists_across_opens() {
        let path = std::env::temp_dir().join(format!("torus-life-store-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let glider = Pattern::Glider.seed(20);
        {
            let mut store = StateStore::new(FileBackend::open(&path).unwrap());
            store.set_current_generation(&glider).unwrap();
            store.set_tick_interval(40).unwrap();
        }
        let store = StateStore::new(FileBackend::open(&path).unwrap());
        assert_eq!(store.current_generation(), glider);
        assert_eq!(store.live_cell_count(), 5);
        assert_eq!(store.tick_interval(), 40);

        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileBackend::open(&path), Err(StoreError::Corrupt { .. })));
        let _ = fs::remove_file(&path);
    }
}
