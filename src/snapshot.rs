// Catalog snapshot export: pretty JSON plus gzip and LZ4 copies.

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use lz4_flex::compress_prepend_size;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::model::{Card, Cycle, Pack};

pub const SNAPSHOT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct Meta {
    pub version: String,
    pub generated_at_utc: DateTime<Utc>,
    pub fetched_at_utc: DateTime<Utc>,
    pub data_sources: Vec<String>,
    pub total_cards: usize,
    pub total_packs: usize,
}

#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub meta: Meta,
    pub cycles: Vec<Cycle>,
    pub packs: &'a [Pack],
    pub cards: &'a [Card],
}

impl<'a> Snapshot<'a> {
    pub fn new(catalog: &'a Catalog, data_sources: Vec<String>) -> Self {
        Snapshot {
            meta: Meta {
                version: SNAPSHOT_VERSION.to_string(),
                generated_at_utc: Utc::now(),
                fetched_at_utc: catalog.fetched_at(),
                data_sources,
                total_cards: catalog.cards().len(),
                total_packs: catalog.packs().len(),
            },
            cycles: catalog.cycles_and_packs(),
            packs: catalog.packs(),
            cards: catalog.cards(),
        }
    }
}

/// Paths and sizes of the files one export wrote.
#[derive(Debug)]
pub struct ExportReport {
    pub json_path: PathBuf,
    pub json_bytes: usize,
    pub gzip_path: PathBuf,
    pub gzip_bytes: usize,
    pub lz4_path: PathBuf,
    pub lz4_bytes: usize,
}

pub fn compress_with_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn compress_with_lz4(data: &[u8]) -> Vec<u8> {
    compress_prepend_size(data)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `snapshot` to `json_path`, with `.gz` and `.lz4` siblings.
pub fn export(snapshot: &Snapshot<'_>, json_path: &Path) -> Result<ExportReport> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    File::create(json_path)?.write_all(&json)?;

    let gzip_path = with_suffix(json_path, ".gz");
    let gzip = compress_with_gzip(&json)?;
    File::create(&gzip_path)?.write_all(&gzip)?;

    let lz4_path = with_suffix(json_path, ".lz4");
    let lz4 = compress_with_lz4(&json);
    File::create(&lz4_path)?.write_all(&lz4)?;

    info!(
        "Snapshot of {} cards written to {} ({} KB, gzip {} KB, lz4 {} KB)",
        snapshot.meta.total_cards,
        json_path.display(),
        json.len() / 1024,
        gzip.len() / 1024,
        lz4.len() / 1024
    );

    Ok(ExportReport {
        json_path: json_path.to_path_buf(),
        json_bytes: json.len(),
        gzip_path,
        gzip_bytes: gzip.len(),
        lz4_path,
        lz4_bytes: lz4.len(),
    })
}
