//! Test fixtures for declaration-file tests
//!
//! - `layouts/standard.toml`: the standard two-sidebar page and its variants

use std::path::{Path, PathBuf};

use section_cascade::{DeclarationFile, DefinitionRegistry, ProviderTable};

/// Path to the standard layouts fixture
pub fn standard_layouts_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/layouts/standard.toml")
}

/// Build the standard layouts with the given providers attached
pub fn standard_registry(providers: &ProviderTable) -> DefinitionRegistry {
    let (file, _) = DeclarationFile::load(&standard_layouts_path()).expect("fixture loads");
    file.into_registry(providers).expect("fixture builds")
}
