use crate::domain::ports::UnitSource;
use crate::domain::tree::CompilationUnit;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Typed-tree provider reading a compilation unit from a JSON file.
pub struct JsonUnitSource {
    pub unit_path: PathBuf,
}

impl JsonUnitSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            unit_path: path.as_ref().to_path_buf(),
        }
    }
}

impl UnitSource for JsonUnitSource {
    fn load(&self) -> Result<CompilationUnit> {
        load_unit_file(&self.unit_path)
    }
}

fn load_unit_file(path: &Path) -> Result<CompilationUnit> {
    use memmap2::Mmap;
    use std::fs::File;

    let file = File::open(path)
        .with_context(|| format!("Failed to open unit file: {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat unit file: {}", path.display()))?
        .len();
    if len == 0 {
        bail!("Unit file is empty: {}", path.display());
    }
    let mmap = unsafe { Mmap::map(&file).context("Failed to mmap unit file")? };
    decode_unit(&mmap[..])
        .with_context(|| format!("Failed to decode compilation unit: {}", path.display()))
}

/// Decodes a unit of any nesting depth; the stack grows on demand.
fn decode_unit(bytes: &[u8]) -> serde_json::Result<CompilationUnit> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let unit = CompilationUnit::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(unit)
}
