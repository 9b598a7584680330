use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use crate::aerosol::Species;
use crate::config::HYDROPHILICITY_FILE;
use crate::error::LutError;

/// Whether `species` is hydrophilic, according to the table in `data_directory`.
pub fn read_aerosol_hydrophilicity(
    data_directory: &Path,
    species: Species,
) -> Result<bool, LutError> {
    let path = data_directory.join(HYDROPHILICITY_FILE);
    let file = File::open(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LutError::DataNotFound { path: path.clone() },
        _ => LutError::Io(e),
    })?;

    let table: HashMap<String, bool> = serde_json::from_reader(BufReader::new(file))?;

    table
        .get(species.key())
        .copied()
        .ok_or_else(|| LutError::KeyLookup {
            kind: "hydrophilicity",
            key: species.key().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_hydrophilicity() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(HYDROPHILICITY_FILE),
            r#"{ "sulphate": true, "dust": false }"#,
        )
        .unwrap();

        assert!(read_aerosol_hydrophilicity(dir.path(), Species::Sulfate).unwrap());
        assert!(!read_aerosol_hydrophilicity(dir.path(), Species::Dust).unwrap());
    }

    #[test]
    fn test_missing_species_names_the_key() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(HYDROPHILICITY_FILE), r#"{ "dust": false }"#).unwrap();

        let err = read_aerosol_hydrophilicity(dir.path(), Species::SeaSalt).unwrap_err();
        assert!(matches!(err, LutError::KeyLookup { .. }));
        assert!(err.to_string().contains("sea_salt"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_aerosol_hydrophilicity(dir.path(), Species::Dust).unwrap_err();
        assert!(matches!(err, LutError::DataNotFound { .. }));
    }
}
