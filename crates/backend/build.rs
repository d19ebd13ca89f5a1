//! Copies the workspace `config.toml` next to the built binary so the server
//! finds it when started from `target/<profile>`.

use std::path::{Path, PathBuf};

fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR")?);
    let profile = std::env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn main() {
    let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    println!("cargo:rerun-if-changed={}", config.display());

    if !config.exists() {
        println!("cargo:warning=config.toml not found, the server will use its defaults");
        return;
    }
    let Some(dir) = profile_dir() else {
        println!("cargo:warning=target profile directory not found, config.toml not copied");
        return;
    };
    if let Err(e) = std::fs::copy(&config, dir.join("config.toml")) {
        println!("cargo:warning=failed to copy config.toml: {}", e);
    }
}
