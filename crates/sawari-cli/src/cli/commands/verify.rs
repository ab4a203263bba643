//! `sawari verify` – consistency gate over a session folder.

use anyhow::{bail, Result};
use sawari_core::verify;
use std::path::Path;

pub fn run_verify(folder: &Path) -> Result<()> {
    let report = verify::check_folder(folder)?;
    println!("{report}");
    if !report.pass() {
        bail!("datasets in {} are inconsistent", folder.display());
    }
    Ok(())
}
