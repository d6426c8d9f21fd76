//! Build script for the dxsession crate.
//!
//! Loads the backend URL at compile time so `SessionConfig::from_env()` can read it
//! through `option_env!()`.
//!
//! Priority order:
//! 1. `DXSESSION_API_URL` already set in the environment (CI/CD, shell)
//! 2. The value from a `.env` file next to `Cargo.toml`
//! 3. The value from `.env.example` (fallback for CI builds)

use std::env;
use std::fs;
use std::path::PathBuf;

const API_URL_VAR: &str = "DXSESSION_API_URL";

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-changed=.env.example");
    println!("cargo:rerun-if-env-changed={}", API_URL_VAR);

    if env::var(API_URL_VAR).is_ok() {
        println!(
            "cargo:warning=Using {} from the environment",
            API_URL_VAR
        );
        return;
    }

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let root = PathBuf::from(manifest_dir);

    let candidates = [
        (root.join(".env"), ".env"),
        (root.join(".env.example"), ".env.example (fallback)"),
    ];

    for (path, description) in candidates {
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=')
                && key.trim() == API_URL_VAR
            {
                println!(
                    "cargo:warning=Loaded {} from {}",
                    API_URL_VAR, description
                );
                println!("cargo:rustc-env={}={}", API_URL_VAR, value.trim());
                return;
            }
        }
    }

    println!(
        "cargo:warning={} not set, SessionConfig::from_env_or_default() will use the default backend URL",
        API_URL_VAR
    );
}
