//! Framework tables: the known function, variable and keyword names of a Dawn project
//!
//! A framework file (`framework.fw`) lives next to the scripts that use it and
//! declares one or more categories:
//!
//! ```text
//! funcs:
//! say
//! ask
//! ;
//! vars:
//! $hello
//! ;
//! ```
//!
//! The table is loaded once per server session and handed to the analysis
//! layer through a [`FrameworkRegistry`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;
use tracing::{debug, info, warn};

/// File name looked up next to an open document.
pub const FRAMEWORK_FILE_NAME: &str = "framework.fw";

/// Category holding callable names.
pub const FUNCS: &str = "funcs";
/// Category holding framework-provided (read-only) variables.
pub const VARS: &str = "vars";
/// Category holding additional keywords.
pub const KEYWORD_OTHER: &str = "keywordOther";

/// Errors raised while locating or reading a framework file.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("failed to read framework file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document URI {0} does not name a local file")]
    InvalidUri(Url),
}

/// Mapping from category name to the ordered identifiers it declares.
///
/// Serializes as a plain JSON object of string arrays, which is also the
/// payload of the `dawn/framework` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkTable {
    categories: BTreeMap<String, Vec<String>>,
}

impl FrameworkTable {
    /// The table used when no framework file is available.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        table.insert(FUNCS, ["say", "short_say", "ask"]);
        table.insert(VARS, ["$hello"]);
        table.insert(KEYWORD_OTHER, ["let"]);
        table
    }

    /// Replaces a category with the given members.
    pub fn insert<I, S>(&mut self, category: &str, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(category.to_string(), members.into_iter().map(Into::into).collect());
    }

    /// Members of a category; missing categories read as empty.
    pub fn category(&self, name: &str) -> &[String] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    pub fn funcs(&self) -> &[String] {
        self.category(FUNCS)
    }

    pub fn vars(&self) -> &[String] {
        self.category(VARS)
    }

    pub fn keyword_other(&self) -> &[String] {
        self.category(KEYWORD_OTHER)
    }

    /// Iterates over `(category, members)` pairs in name order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Parses the line-oriented framework format.
    ///
    /// A line whose first word ends with `:` opens a category; each following
    /// line contributes its first word until a line starting with `;`. Lines
    /// outside a category that do not open one are ignored, so parsing never
    /// fails.
    pub fn parse(source: &str) -> Self {
        let mut table = Self::default();
        let mut open: Option<String> = None;

        for line in source.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let first_word = line.split(' ').next().unwrap_or("").trim();

            match open.as_deref() {
                Some(_) if first_word == ";" => open = None,
                Some(category) => {
                    table
                        .categories
                        .entry(category.to_string())
                        .or_default()
                        .push(first_word.to_string());
                }
                None => {
                    if let Some(name) = first_word.strip_suffix(':') {
                        table.categories.insert(name.to_string(), Vec::new());
                        // A bare ":" header declares an empty category but never opens it.
                        if !name.is_empty() {
                            open = Some(name.to_string());
                        }
                    }
                }
            }
        }

        table
    }

    /// Reads and parses a framework file.
    pub fn read(path: &Path) -> Result<Self, FrameworkError> {
        let source = fs::read_to_string(path).map_err(|source| FrameworkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source))
    }

    /// Reads and parses a framework file without blocking the runtime.
    pub async fn read_async(path: &Path) -> Result<Self, FrameworkError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FrameworkError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&source))
    }

    /// Loads a framework file, falling back to [`FrameworkTable::builtin`] when
    /// there is no path or the file cannot be read.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            debug!("No framework file to load, using builtin framework");
            return Self::builtin();
        };

        match Self::read(path) {
            Ok(table) => {
                info!("Loaded framework from {:?}", path);
                table
            }
            Err(e) => {
                warn!("{}; using builtin framework", e);
                Self::builtin()
            }
        }
    }
}

/// Resolves the framework file that sits next to a `file://` document.
pub fn framework_path_for(document: &Url) -> Result<PathBuf, FrameworkError> {
    let path = document
        .to_file_path()
        .map_err(|()| FrameworkError::InvalidUri(document.clone()))?;
    let dir = path
        .parent()
        .ok_or_else(|| FrameworkError::InvalidUri(document.clone()))?;
    Ok(dir.join(FRAMEWORK_FILE_NAME))
}

/// Where the registry's table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkSource {
    Notification,
    CommandLine,
    AdjacentFile,
    Builtin,
}

/// Fill-once holder of the session's framework table.
///
/// The first source to provide a table wins; later ones are ignored. Until a
/// table is provided, readers see the builtin table without it being stored,
/// so a framework arriving late still takes effect.
#[derive(Debug, Default)]
pub struct FrameworkRegistry {
    table: OnceLock<(Arc<FrameworkTable>, FrameworkSource)>,
}

static BUILTIN: Lazy<Arc<FrameworkTable>> = Lazy::new(|| Arc::new(FrameworkTable::builtin()));

impl FrameworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that is already filled.
    pub fn with_table(table: FrameworkTable, source: FrameworkSource) -> Self {
        let registry = Self::new();
        registry.provide(table, source);
        registry
    }

    /// Offers a table. Returns `true` if it was accepted.
    pub fn provide(&self, table: FrameworkTable, source: FrameworkSource) -> bool {
        let mut accepted = false;
        self.table.get_or_init(|| {
            accepted = true;
            (Arc::new(table), source)
        });

        if accepted {
            info!("Framework table set from {:?}", source);
        } else {
            debug!(
                "Ignoring framework from {:?}; already loaded from {:?}",
                source,
                self.source()
            );
        }
        accepted
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn source(&self) -> Option<FrameworkSource> {
        self.table.get().map(|(_, source)| *source)
    }

    /// The session table, or the builtin table while none was provided.
    pub fn table(&self) -> Arc<FrameworkTable> {
        match self.table.get() {
            Some((table, _)) => Arc::clone(table),
            None => {
                debug!("No framework loaded yet; using builtin framework");
                Arc::clone(&BUILTIN)
            }
        }
    }
}
