//! Component discovery and the discovery metadata cache.
//!
//! Discovery turns a list of namespace prefixes into component descriptors.
//! The built-in [`ComponentCatalog`] is an explicit table of descriptor
//! factories keyed by canonical type name, filtered by prefix. A
//! [`MetadataCache`] persists the names found by a successful scan so a later
//! start can rehydrate them when discovery yields nothing.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::descriptor::ComponentDescriptor;

/// Default file written by [`FileMetadataCache`].
pub const DEFAULT_CACHE_FILE: &str = ".aeolus.cache";

/// Source of component descriptors for a scan.
pub trait ComponentDiscovery: Send + Sync {
    /// Descriptors whose canonical type name starts with any of `prefixes`.
    /// An empty prefix list matches everything.
    fn discover(&self, prefixes: &[&str]) -> Vec<ComponentDescriptor>;
}

/// Persistence for the result of a successful scan.
pub trait MetadataCache: Send + Sync {
    /// Records the discovered components, replacing any earlier record.
    fn save(&self, components: &[ComponentDescriptor]) -> Result<(), CacheError>;

    /// Previously recorded components matching `prefixes`.
    fn load(&self, prefixes: &[&str]) -> Result<Vec<ComponentDescriptor>, CacheError>;
}

/// Failure reading or writing a metadata cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Whether `name` falls under any of `prefixes`. Blank prefixes are ignored;
/// no usable prefix matches everything.
pub fn matches_prefixes(name: &str, prefixes: &[&str]) -> bool {
    let mut usable = prefixes.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).peekable();
    if usable.peek().is_none() {
        return true;
    }
    usable.any(|prefix| name.starts_with(prefix))
}

/// Explicit table of discoverable components.
///
/// # Examples
///
/// ```
/// use aeolus_di::{ComponentCatalog, ComponentDescriptor, ComponentDiscovery};
///
/// mod billing {
///     #[derive(Default)]
///     pub struct Invoices;
/// }
/// mod shipping {
///     #[derive(Default)]
///     pub struct Parcels;
/// }
///
/// let catalog = ComponentCatalog::new()
///     .with(|| ComponentDescriptor::builder::<billing::Invoices>().default_constructor().build())
///     .with(|| ComponentDescriptor::builder::<shipping::Parcels>().default_constructor().build());
///
/// assert_eq!(catalog.len(), 2);
/// let prefix = std::any::type_name::<billing::Invoices>().trim_end_matches("Invoices");
/// let found = catalog.discover(&[prefix]);
/// assert_eq!(found.len(), 1);
/// assert!(found[0].type_name().ends_with("billing::Invoices"));
/// ```
#[derive(Default, Clone)]
pub struct ComponentCatalog {
    entries: BTreeMap<&'static str, fn() -> ComponentDescriptor>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor factory, keyed by the type name it describes.
    pub fn with(mut self, factory: fn() -> ComponentDescriptor) -> Self {
        self.add(factory);
        self
    }

    pub fn add(&mut self, factory: fn() -> ComponentDescriptor) {
        let name = factory().type_name();
        self.entries.insert(name, factory);
    }

    /// Fresh descriptor for a canonical type name.
    pub fn get(&self, name: &str) -> Option<ComponentDescriptor> {
        self.entries.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ComponentDiscovery for ComponentCatalog {
    fn discover(&self, prefixes: &[&str]) -> Vec<ComponentDescriptor> {
        self.entries
            .iter()
            .filter(|(name, _)| matches_prefixes(name, prefixes))
            .map(|(_, factory)| factory())
            .collect()
    }
}

/// Text-file cache: one canonical type name per line, rehydrated through a
/// [`ComponentCatalog`]. Names the catalog no longer knows are skipped.
///
/// # Examples
///
/// ```
/// use aeolus_di::{ComponentCatalog, ComponentDescriptor, FileMetadataCache, MetadataCache};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Mailer;
///
/// let catalog = Arc::new(
///     ComponentCatalog::new().with(|| ComponentDescriptor::builder::<Mailer>().default_constructor().build()),
/// );
/// let dir = tempfile::tempdir().unwrap();
/// let cache = FileMetadataCache::new(dir.path().join("components.cache"), catalog.clone());
///
/// cache.save(&[catalog.get(std::any::type_name::<Mailer>()).unwrap()]).unwrap();
/// let loaded = cache.load(&[]).unwrap();
/// assert_eq!(loaded.len(), 1);
/// ```
pub struct FileMetadataCache {
    path: PathBuf,
    catalog: Arc<ComponentCatalog>,
}

impl FileMetadataCache {
    pub fn new(path: impl Into<PathBuf>, catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            path: path.into(),
            catalog,
        }
    }

    /// Cache at [`DEFAULT_CACHE_FILE`] in the working directory.
    pub fn in_working_dir(catalog: Arc<ComponentCatalog>) -> Self {
        Self::new(DEFAULT_CACHE_FILE, catalog)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl MetadataCache for FileMetadataCache {
    fn save(&self, components: &[ComponentDescriptor]) -> Result<(), CacheError> {
        if components.is_empty() {
            return Ok(());
        }
        let file = fs::File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut out = BufWriter::new(file);
        for component in components {
            writeln!(out, "{}", component.type_name()).map_err(|e| self.io_error(e))?;
        }
        out.flush().map_err(|e| self.io_error(e))
    }

    fn load(&self, prefixes: &[&str]) -> Result<Vec<ComponentDescriptor>, CacheError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut components = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| self.io_error(e))?;
            let name = line.trim();
            if name.is_empty() || !matches_prefixes(name, prefixes) {
                continue;
            }
            if let Some(descriptor) = self.catalog.get(name) {
                components.push(descriptor);
            }
        }
        Ok(components)
    }
}

/// Cache that keeps the descriptors themselves, for tests and for processes
/// that rebuild containers repeatedly.
#[derive(Default)]
pub struct InMemoryMetadataCache {
    components: Mutex<Vec<ComponentDescriptor>>,
}

impl InMemoryMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.lock().is_empty()
    }
}

impl MetadataCache for InMemoryMetadataCache {
    fn save(&self, components: &[ComponentDescriptor]) -> Result<(), CacheError> {
        if !components.is_empty() {
            *self.components.lock() = components.to_vec();
        }
        Ok(())
    }

    fn load(&self, prefixes: &[&str]) -> Result<Vec<ComponentDescriptor>, CacheError> {
        Ok(self
            .components
            .lock()
            .iter()
            .filter(|c| matches_prefixes(c.type_name(), prefixes))
            .cloned()
            .collect())
    }
}
