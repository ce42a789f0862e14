//! JSON/YAML string codecs for record lists and single records.

use super::{DataAccessError, DataFormat, DataResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a record list; JSON output is pretty-printed.
pub fn list_to_string<T: Serialize>(items: &[T], format: DataFormat) -> DataResult<String> {
    encode(items, format, "failed to serialize list")
}

/// Encodes one record.
pub fn to_string<T: Serialize>(item: &T, format: DataFormat) -> DataResult<String> {
    encode(item, format, "failed to serialize item")
}

/// Decodes one record, rejecting blank input.
pub fn from_string<T: DeserializeOwned>(input: &str, format: DataFormat) -> DataResult<T> {
    if input.trim().is_empty() {
        return Err(DataAccessError::EmptyInput);
    }
    decode(input, format, "failed to deserialize item")
}

/// Decodes a record list; blank input decodes to an empty list.
pub fn list_from_string<T: DeserializeOwned>(
    input: &str,
    format: DataFormat,
    context: &str,
) -> DataResult<Vec<T>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    // A YAML document holding only `null` or `~` is an empty collection too.
    let items: Option<Vec<T>> = decode(input, format, context)?;
    Ok(items.unwrap_or_default())
}

fn encode<T: Serialize + ?Sized>(value: &T, format: DataFormat, context: &str) -> DataResult<String> {
    match format {
        DataFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|source| DataAccessError::Json {
                context: format!("{context} to JSON"),
                source,
            })
        }
        DataFormat::Yaml => serde_yaml::to_string(value).map_err(|source| DataAccessError::Yaml {
            context: format!("{context} to YAML"),
            source,
        }),
    }
}

fn decode<T: DeserializeOwned>(input: &str, format: DataFormat, context: &str) -> DataResult<T> {
    match format {
        DataFormat::Json => serde_json::from_str(input).map_err(|source| DataAccessError::Json {
            context: context.to_string(),
            source,
        }),
        DataFormat::Yaml => serde_yaml::from_str(input).map_err(|source| DataAccessError::Yaml {
            context: context.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{from_string, list_from_string, list_to_string};
    use crate::model::branch::Branch;
    use crate::persistence::{DataAccessError, DataFormat};

    #[test]
    fn yaml_list_survives_encode_decode() {
        let branches = vec![
            Branch::new("Central", "Kyiv").unwrap(),
            Branch::new("Airport", "Boryspil").unwrap(),
        ];
        let yaml = list_to_string(&branches, DataFormat::Yaml).unwrap();
        let decoded: Vec<Branch> = list_from_string(&yaml, DataFormat::Yaml, "test").unwrap();
        assert_eq!(decoded, branches);
    }

    #[test]
    fn blank_list_input_is_empty_but_blank_item_is_rejected() {
        let decoded: Vec<Branch> = list_from_string("  \n", DataFormat::Json, "test").unwrap();
        assert!(decoded.is_empty());

        let err = from_string::<Branch>("   ", DataFormat::Json).unwrap_err();
        assert!(matches!(err, DataAccessError::EmptyInput));
    }

    #[test]
    fn invalid_record_fails_decode_with_validation_message() {
        let err = from_string::<Branch>(r#"{"name": "", "location": "Lviv"}"#, DataFormat::Json)
            .unwrap_err();
        assert!(err.to_string().contains("branch name"), "unexpected error: {err}");
    }
}
