use serde::de::DeserializeOwned;
use std::fs;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed or does not match `T`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;
    log::debug!("Read {} bytes from '{}'.", data.len(), file_path);

    parse_json_str(&data)
}

/// Parses an in-memory JSON document into `T`.
pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    let parsed_data: T = serde_json::from_str(data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config_dto::PlanningConfigDto;

    #[test]
    fn test_parse_json_str_applies_defaults() {
        let dto: PlanningConfigDto = parse_json_str(r#"{ "routing": { "kPaths": 3 } }"#).unwrap();

        assert_eq!(dto.routing.k_paths, 3);
        assert_eq!(dto.spectrum.f_min, 191.3e12);
        assert_eq!(dto.routing.max_explored_paths, 100_000);
    }

    #[test]
    fn test_parse_json_file_missing_file_is_io_error() {
        let result: Result<PlanningConfigDto> = parse_json_file("does/not/exist.json");

        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_parse_json_str_malformed_is_deserialization_error() {
        let result: Result<PlanningConfigDto> = parse_json_str("{ not json");

        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }
}
