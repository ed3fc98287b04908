// Persisted expansion selection.
//
// The selection is a set of canonical expansion names stored as a JSON array
// of strings. Pack codes the user picked directly go to a `.packs` file next
// to it, in the same format. Both are read once when the store opens and
// rewritten on every change. Stored data is treated as untrusted: a missing
// or empty file, an unparsable file and non-string entries all degrade to
// what can be salvaged.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::filter::FilterState;

#[derive(Debug)]
pub struct ExpansionSelection {
    path: PathBuf,
    selected: BTreeSet<String>,
    packs: BTreeSet<String>,
}

/// Outcome of adding user-supplied keys to the selection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<String>,
    pub unknown: Vec<String>,
}

fn packs_path(path: &Path) -> PathBuf {
    let mut packs = OsString::from(path.as_os_str());
    packs.push(".packs");
    PathBuf::from(packs)
}

fn read_names(path: &Path) -> BTreeSet<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No saved expansion selection at {}", path.display());
            return BTreeSet::new();
        }
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            return BTreeSet::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_reader(BufReader::new(file)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring unreadable expansion selection in {}: {e}", path.display());
            return BTreeSet::new();
        }
    };

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(name) if !name.trim().is_empty() => Some(name),
                _ => None,
            })
            .collect(),
        _ => {
            warn!("Expansion selection in {} is not a list", path.display());
            BTreeSet::new()
        }
    }
}

fn write_names(path: &Path, names: &BTreeSet<String>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, names)?;
    writer.flush()?;
    Ok(())
}

impl ExpansionSelection {
    /// Opens the store backed by `path`, loading whatever is saved there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let selected = read_names(&path);
        let packs = read_names(&packs_path(&path));
        info!(
            "Loaded {} selected expansions from {}",
            selected.len(),
            path.display()
        );
        ExpansionSelection {
            path,
            selected,
            packs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Pack codes picked directly rather than by expansion name.
    pub fn preferred_packs(&self) -> &BTreeSet<String> {
        &self.packs
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, expansion: &str) -> bool {
        self.selected.contains(expansion)
    }

    pub fn save(&self) -> Result<()> {
        self.write(&self.selected, &self.packs)
    }

    fn write(&self, selected: &BTreeSet<String>, packs: &BTreeSet<String>) -> Result<()> {
        write_names(&packs_path(&self.path), packs)?;
        write_names(&self.path, selected)?;
        debug!(
            "Saved {} selected expansions to {}",
            selected.len(),
            self.path.display()
        );
        Ok(())
    }

    // Memory is only updated once both files are written.
    fn commit(&mut self, selected: BTreeSet<String>, packs: BTreeSet<String>) -> Result<()> {
        self.write(&selected, &packs)?;
        self.selected = selected;
        self.packs = packs;
        Ok(())
    }

    /// Resolves each key against the catalog and adds the canonical names.
    /// Keys that are pack codes are also remembered as preferred packs.
    /// Keys the catalog cannot resolve are reported, not stored.
    pub fn add_keys<I, S>(&mut self, catalog: &Catalog, keys: I) -> Result<SelectionChange>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = self.selected.clone();
        let mut packs = self.packs.clone();
        let mut change = SelectionChange::default();
        for key in keys {
            let key = key.as_ref();
            match catalog.resolve_expansion(key) {
                Some(name) => {
                    if let Some(code) = catalog.pack_code(key) {
                        packs.insert(code.to_string());
                    }
                    if selected.insert(name.clone()) {
                        change.added.push(name);
                    }
                }
                None => {
                    warn!("Unknown expansion '{key}'");
                    change.unknown.push(key.to_string());
                }
            }
        }
        if selected != self.selected || packs != self.packs {
            self.commit(selected, packs)?;
        }
        Ok(change)
    }

    /// Removes the expansions the keys resolve to, along with any preferred
    /// packs inside them. Keys that no longer resolve are also tried
    /// verbatim, so stale entries can be cleaned out.
    pub fn remove_keys<I, S>(&mut self, catalog: &Catalog, keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = self.selected.clone();
        let mut removed = Vec::new();
        for key in keys {
            let key = key.as_ref();
            let name = catalog
                .resolve_expansion(key)
                .unwrap_or_else(|| key.trim().to_string());
            if selected.remove(&name) {
                removed.push(name);
            }
        }
        if removed.is_empty() {
            return Ok(removed);
        }

        let packs = self
            .packs
            .iter()
            .filter(|code| {
                catalog
                    .resolve_expansion(code)
                    .map_or(true, |name| selected.contains(&name))
            })
            .cloned()
            .collect();
        self.commit(selected, packs)?;
        Ok(removed)
    }

    pub fn toggle(&mut self, catalog: &Catalog, key: &str) -> Result<Option<bool>> {
        let Some(name) = catalog.resolve_expansion(key) else {
            return Ok(None);
        };
        let mut selected = self.selected.clone();
        let mut packs = self.packs.clone();
        let now_selected = if selected.remove(&name) {
            packs.retain(|code| catalog.resolve_expansion(code).as_ref() != Some(&name));
            false
        } else {
            selected.insert(name);
            if let Some(code) = catalog.pack_code(key) {
                packs.insert(code.to_string());
            }
            true
        };
        self.commit(selected, packs)?;
        Ok(Some(now_selected))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(BTreeSet::new(), BTreeSet::new())
    }

    /// Copies the selection into the expansion facet.
    pub fn apply(&self, facets: &mut FilterState) {
        facets.expansions = self.selected.clone();
        facets.preferred_packs = self.packs.clone();
    }
}
