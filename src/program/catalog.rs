use crate::program::types::*;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use tracing::{debug, info};

/// Source of programs and their graded question banks.
///
/// Queried once when a session is created and never again while it runs.
#[async_trait]
pub trait ProgramCatalog: Send + Sync {
    async fn get_program(&self, program_id: &str) -> Result<Option<Program>>;
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    programs: DashMap<ProgramId, Program>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_programs(programs: impl IntoIterator<Item = Program>) -> Self {
        let catalog = Self::new();
        for program in programs {
            catalog.insert(program);
        }
        catalog
    }

    /// Insert or replace a program
    pub fn insert(&self, program: Program) {
        debug!("Registering program {} ({})", program.id, program.name);
        self.programs.insert(program.id.clone(), program);
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Load a program file and register it, returning the program id
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<ProgramId> {
        let program = load_program_file(path)?;
        let id = program.id.clone();
        self.insert(program);
        Ok(id)
    }
}

#[async_trait]
impl ProgramCatalog for InMemoryCatalog {
    async fn get_program(&self, program_id: &str) -> Result<Option<Program>> {
        Ok(self
            .programs
            .get(program_id)
            .map(|entry| entry.value().clone()))
    }
}

/// Parse a program from a `.toml` or `.json` file
pub fn load_program_file<P: AsRef<Path>>(path: P) -> Result<Program> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read program file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let program: Program = match extension.as_str() {
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML program: {}", path.display()))?,
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON program: {}", path.display()))?,
        other => bail!("Unsupported program file extension: '{}'", other),
    };

    info!(
        "Loaded program {} with {} levels and {} questions",
        program.id,
        program.levels.len(),
        program.total_questions()
    );
    Ok(program)
}
