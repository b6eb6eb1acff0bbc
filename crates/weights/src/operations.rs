// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// internal modules
use crate::error::{Error, Result};
use crate::weight_window::WeightWindowSet;

// external crates
use log::{debug, warn};

/// Write a collection of weight window sets to a single file
///
/// A [WeightWindowSet] corresponds to a full set of weight windows for a
/// single particle type. Several can be combined into one file, but transport
/// engines expect at most one set per particle and generally a common mesh.
///
/// Note that:
/// - Duplicate particle types are removed, keeping the first
/// - Sets on a different mesh to the first are removed
///
/// Both cases raise a warning. The original order of the remaining sets is
/// preserved.
///
/// ```rust, no_run
/// # use wwforge_weights::{read_weight_windows, write_weight_windows};
/// let sets = read_weight_windows("weight_windows.json").unwrap();
/// write_weight_windows(&sets, "weight_windows_copy.json").unwrap();
/// ```
pub fn write_weight_windows<P: AsRef<Path>>(weight_windows: &[WeightWindowSet], path: P) -> Result<()> {
    let ww_list = preprocess_set(weight_windows)?;
    debug!(
        "Writing {} weight window set(s) to {}",
        ww_list.len(),
        path.as_ref().display()
    );

    let f = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(f, &ww_list)?;
    Ok(())
}

/// Read a collection of weight window sets from file
///
/// Every set is validated as it is read, so inconsistent files fail here.
pub fn read_weight_windows<P: AsRef<Path>>(path: P) -> Result<Vec<WeightWindowSet>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Remove duplicate particles and any sets on a different mesh
fn preprocess_set(weight_windows: &[WeightWindowSet]) -> Result<Vec<&WeightWindowSet>> {
    let target = weight_windows.first().ok_or(Error::EmptySet)?;
    let mut ww_list: Vec<&WeightWindowSet> = Vec::with_capacity(weight_windows.len());

    for ww in weight_windows {
        if ww_list.iter().any(|kept| kept.particle == ww.particle) {
            warn!("Warning: Duplicate {} weight windows removed", ww.particle);
        } else if ww.mesh != target.mesh {
            warn!(
                "Warning: {} weight windows removed, mesh {} does not match mesh {}",
                ww.particle, ww.mesh.id, target.mesh.id
            );
        } else {
            ww_list.push(ww);
        }
    }

    Ok(ww_list)
}
