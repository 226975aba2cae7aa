//! Writes the reporting API's OpenAPI document to disk so client generators
//! and the docs site can consume it without a running server.
//!
//! Usage: `openapi-export [OUTPUT_PATH]`, defaulting to
//! `docs/openapi/k9ops-reports.v1.json`.

use std::{fs, path::PathBuf};

use anyhow::Context;
use k9ops_api::openapi::ApiDocV1;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "docs/openapi/k9ops-reports.v1.json";

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let document = ApiDocV1::openapi();
    let json = document
        .to_pretty_json()
        .context("serializing the OpenAPI document")?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&output_path, json)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "OpenAPI document for {} v{} written to {}",
        document.info.title,
        document.info.version,
        output_path.display()
    );
    Ok(())
}
