//! Model keys derived from input filenames.

use std::fmt;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::Serialize;

/// Canonical, filesystem-safe identifier for one dataset item.
///
/// All three artifacts of an item are named after its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModelKey(String);

impl ModelKey {
    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the model key for an input path.
///
/// Takes the final path segment, lower-cases it, turns spaces and dots into
/// underscores and drops parentheses. The transform is lossy: names that
/// differ only in case or punctuation share a key (see [`KeyRegistry`]).
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::sanitize;
///
/// assert_eq!(sanitize("raw/My Model (v2).OBJ").as_str(), "my_model_v2_obj");
/// ```
#[must_use]
pub fn sanitize(path: &str) -> ModelKey {
    let name = path
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or_default();

    let key = name
        .to_lowercase()
        .replace(' ', "_")
        .replace('.', "_")
        .replace(['(', ')'], "");
    ModelKey(key)
}

/// [`sanitize`] for a filesystem path.
#[must_use]
pub fn sanitize_path(path: &Path) -> ModelKey {
    sanitize(&path.to_string_lossy())
}

/// Distinct input paths that share one model key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    /// The shared key.
    pub key: ModelKey,
    /// Source paths in discovery order; the first owns the key.
    pub paths: Vec<PathBuf>,
}

/// Maps each model key back to every source path that produced it.
///
/// Populated during enumeration, before any conversion, so collisions are
/// reported up front instead of surfacing as overwritten or silently skipped
/// artifacts.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    sources: HashMap<ModelKey, Vec<PathBuf>>,
    order: Vec<ModelKey>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry over `paths` in order.
    #[must_use]
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Self {
        let mut registry = Self::new();
        for path in paths {
            registry.register(path);
        }
        registry
    }

    /// Records `path`, returning its key.
    ///
    /// Registering the same path twice has no effect.
    pub fn register(&mut self, path: &Path) -> ModelKey {
        let key = sanitize_path(path);
        let sources = self.sources.entry(key.clone()).or_insert_with(|| {
            self.order.push(key.clone());
            Vec::new()
        });
        if !sources.iter().any(|p| p == path) {
            sources.push(path.to_path_buf());
        }
        key
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The path that owns `key`: the first one registered for it.
    #[must_use]
    pub fn owner(&self, key: &ModelKey) -> Option<&Path> {
        self.sources.get(key).and_then(|paths| paths.first()).map(PathBuf::as_path)
    }

    /// Whether `path` is registered and owns its key.
    #[must_use]
    pub fn is_owner(&self, path: &Path) -> bool {
        self.owner(&sanitize_path(path)) == Some(path)
    }

    /// Every key with more than one source, in first-registration order.
    #[must_use]
    pub fn collisions(&self) -> Vec<KeyCollision> {
        self.order
            .iter()
            .filter_map(|key| {
                let paths = self.sources.get(key)?;
                (paths.len() > 1).then(|| KeyCollision {
                    key: key.clone(),
                    paths: paths.clone(),
                })
            })
            .collect()
    }
}
