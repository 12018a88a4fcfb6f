//! JSON parameter file loading and saving

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::ParameterSet;
use crate::error::EsgResult;

/// Load and validate a parameter set from a JSON file
pub fn load_parameters<P: AsRef<Path>>(path: P) -> EsgResult<ParameterSet> {
    let file = File::open(path.as_ref())?;
    let params = load_parameters_from_reader(BufReader::new(file))?;
    log::info!("Loaded {} parameters from {}", params.model_name(), path.as_ref().display());
    Ok(params)
}

/// Load and validate a parameter set from any reader
pub fn load_parameters_from_reader<R: Read>(reader: R) -> EsgResult<ParameterSet> {
    let params: ParameterSet = serde_json::from_reader(reader)?;
    params.validate()?;
    Ok(params)
}

/// Write a parameter set as pretty-printed JSON
pub fn save_parameters<W: Write>(params: &ParameterSet, writer: W) -> EsgResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, params)?;
    writer.flush()?;
    Ok(())
}
