//! Run parameters
//!
//! A [`ParameterSet`] is the `runtime_config.parameters` mapping sent when a
//! run is created. Values are arbitrary JSON (scalars, nested mappings,
//! sequences) and are never validated here: the service checks them against
//! the pipeline's declared inputs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building a parameter set
#[derive(Debug, Error)]
pub enum ParameterError {
    /// Parameter file could not be read
    #[error("Failed to read parameter file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parameter document is not valid YAML (or has non-string keys)
    #[error("Failed to parse parameters: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Top level of the document is not a mapping
    #[error("Parameter document must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// `KEY=value` override without `=` or with an empty key
    #[error("Invalid parameter override '{0}': expected KEY=value")]
    InvalidOverride(String),
}

/// Ordered mapping of run parameters
///
/// Keys keep the order they were inserted in (file order when loaded from
/// YAML), so the request body mirrors the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(Map<String, Value>);

impl ParameterSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse a YAML document whose top level is a mapping
    ///
    /// An empty document yields an empty set.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        match serde_yaml::from_str::<Value>(contents)? {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ParameterError::NotAMapping(kind_of(&other))),
        }
    }

    /// Load a YAML parameter file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ParameterError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ParameterError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Insert or replace a top-level parameter
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Apply a `KEY=value` override
    ///
    /// The value is read as YAML, so `epochs=3` sets the number 3 and
    /// `flag=true` the boolean. Anything that is not a YAML scalar is kept
    /// as a plain string.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), ParameterError> {
        let (key, raw) = assignment
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| ParameterError::InvalidOverride(assignment.to_string()))?;

        self.insert(key.trim(), override_value(raw));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ParameterSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Typed value of the right-hand side of an override
///
/// Only booleans, numbers, explicit nulls and quoted strings take their YAML
/// meaning. Everything else, including text YAML would read as a comment or
/// a flow collection, is kept verbatim as a string.
fn override_value(raw: &str) -> Value {
    let verbatim = || Value::String(raw.to_string());
    let trimmed = raw.trim();

    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        Ok(Value::Null) if matches!(trimmed, "null" | "Null" | "NULL" | "~") => Value::Null,
        Ok(value @ Value::String(_)) if trimmed.starts_with(['"', '\'']) => value,
        _ => verbatim(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = r#"
sdg_base_model: s3://models/granite
sdg_scale_factor: 30
sdg_sample_size: 1.0
train_num_epochs_phase_1: 7
train_tolerations:
  - key: nvidia.com/gpu
    operator: Exists
train_node_selectors:
  gpu: "true"
eval_gpu_identifier: nvidia.com/gpu
output_oci_registry_secret:
"#;

    #[test]
    fn test_yaml_preserves_order_and_types() {
        let params = ParameterSet::from_yaml_str(SAMPLE).unwrap();

        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "sdg_base_model",
                "sdg_scale_factor",
                "sdg_sample_size",
                "train_num_epochs_phase_1",
                "train_tolerations",
                "train_node_selectors",
                "eval_gpu_identifier",
                "output_oci_registry_secret",
            ]
        );

        assert_eq!(params.get("sdg_scale_factor"), Some(&json!(30)));
        assert_eq!(params.get("sdg_sample_size"), Some(&json!(1.0)));
        assert_eq!(
            params.get("train_tolerations"),
            Some(&json!([{ "key": "nvidia.com/gpu", "operator": "Exists" }]))
        );
        assert_eq!(params.get("train_node_selectors"), Some(&json!({ "gpu": "true" })));
        assert_eq!(params.get("output_oci_registry_secret"), Some(&Value::Null));
    }

    #[test]
    fn test_yaml_keys_are_not_case_folded() {
        let params = ParameterSet::from_yaml_str("SDG_Base_Model: x\n").unwrap();
        assert!(params.get("SDG_Base_Model").is_some());
        assert!(params.get("sdg_base_model").is_none());
    }

    #[test]
    fn test_empty_document() {
        assert!(ParameterSet::from_yaml_str("").unwrap().is_empty());
        assert!(ParameterSet::from_yaml_str("  \n").unwrap().is_empty());
        assert!(ParameterSet::from_yaml_str("~").unwrap().is_empty());
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = ParameterSet::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ParameterError::NotAMapping("a sequence")));

        let err = ParameterSet::from_yaml_str("just a string").unwrap_err();
        assert!(matches!(err, ParameterError::NotAMapping("a string")));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ParameterSet::from_yaml_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, ParameterError::Parse(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"epochs: 3\nmodel: granite\n").unwrap();

        let params = ParameterSet::from_yaml_file(file.path()).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("epochs"), Some(&json!(3)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline_params.yaml");

        let err = ParameterSet::from_yaml_file(&path).unwrap_err();
        match err {
            ParameterError::Read { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Read error, got: {other}"),
        }
    }

    #[test]
    fn test_overrides() {
        let mut params = ParameterSet::from_yaml_str("epochs: 1\nmodel: granite\n").unwrap();

        params.apply_override("epochs=3").unwrap();
        params.apply_override("flag=true").unwrap();
        params.apply_override("url=http://host:8080/v1?a=b").unwrap();
        params.apply_override("empty=").unwrap();

        assert_eq!(params.get("epochs"), Some(&json!(3)));
        assert_eq!(params.get("flag"), Some(&json!(true)));
        assert_eq!(params.get("url"), Some(&json!("http://host:8080/v1?a=b")));
        assert_eq!(params.get("empty"), Some(&json!("")));

        // replacing a key keeps its original position
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["epochs", "model", "flag", "url", "empty"]);
    }

    #[test]
    fn test_override_non_scalars_stay_verbatim() {
        let mut params = ParameterSet::new();

        params.apply_override("tag=#nightly").unwrap();
        params.apply_override("list=[1, 2]").unwrap();
        params.apply_override("pair=a: b").unwrap();
        params.apply_override("note=fix # 2").unwrap();
        params.apply_override("quoted=\"30\"").unwrap();
        params.apply_override("secret=null").unwrap();
        params.apply_override("ratio=0.5").unwrap();

        assert_eq!(params.get("tag"), Some(&json!("#nightly")));
        assert_eq!(params.get("list"), Some(&json!("[1, 2]")));
        assert_eq!(params.get("pair"), Some(&json!("a: b")));
        assert_eq!(params.get("note"), Some(&json!("fix # 2")));
        assert_eq!(params.get("quoted"), Some(&json!("30")));
        assert_eq!(params.get("secret"), Some(&Value::Null));
        assert_eq!(params.get("ratio"), Some(&json!(0.5)));
    }

    #[test]
    fn test_invalid_override() {
        let mut params = ParameterSet::new();
        assert!(matches!(
            params.apply_override("no-equals"),
            Err(ParameterError::InvalidOverride(_))
        ));
        assert!(matches!(
            params.apply_override("=value"),
            Err(ParameterError::InvalidOverride(_))
        ));
        assert!(params.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_mapping() {
        let params: ParameterSet = vec![("b", json!(1)), ("a", json!({ "x": [1, 2] }))]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"b":1,"a":{"x":[1,2]}}"#
        );
    }
}
