use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::pending::PendingItem;
use crate::core::store::{self, Forest};

pub fn read_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Reads a seed forest and checks it is well formed (unique keys, no leaf
/// with children).
pub fn read_forest<P: AsRef<Path>>(path: P) -> Result<Forest> {
    let path = path.as_ref();
    let forest: Forest = read_json(path)?;
    store::validate(&forest).with_context(|| format!("Malformed tree in {}", path.display()))?;
    Ok(forest)
}

pub fn read_pending<P: AsRef<Path>>(path: P) -> Result<Vec<PendingItem>> {
    read_json(path)
}

/// Writes pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let body = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match path {
        Some(path) => {
            fs::write(path, body + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{body}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
