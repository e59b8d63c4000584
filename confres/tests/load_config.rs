use std::{fs, io::Write};

use confres::{
    ConfigError, Fetch, LoadOptions, MapEnv, ProcessEnv, load_config_file, load_config_file_with,
};
use serde_json::json;

struct StaticFetch(&'static str);

impl Fetch for StaticFetch {
    fn fetch(&self, _url: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

struct FailingFetch;

impl Fetch for FailingFetch {
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        anyhow::bail!("connection refused: {url}")
    }
}

fn env() -> MapEnv {
    MapEnv::new()
        .with("GLOSSARY_OWNER", "mjames")
        .with("GLOSSARY_URL", "https://wiki.example.com")
}

#[test]
fn loads_yaml_and_resolves_placeholders() {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    writeln!(
        file,
        "version: 1\nsource: DataHub\nurl: ${{GLOSSARY_URL}}/terms\nowners:\n  users:\n    - $GLOSSARY_OWNER\n    - $UNSET_OWNER\n"
    )
    .unwrap();

    let config = load_config_file_with(
        file.path().to_str().unwrap(),
        &LoadOptions::default(),
        &FailingFetch,
        &env(),
    )
    .unwrap();

    assert_eq!(
        config,
        json!({
            "version": 1,
            "source": "DataHub",
            "url": "https://wiki.example.com/terms",
            "owners": {"users": ["mjames", "$UNSET_OWNER"]}
        })
    );
}

#[test]
fn loads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipe.toml");
    fs::write(&path, "[source]\ntype = \"glossary\"\nowner = \"${GLOSSARY_OWNER}\"\n").unwrap();

    let config =
        load_config_file_with(path.to_str().unwrap(), &LoadOptions::default(), &FailingFetch, &env())
            .unwrap();
    assert_eq!(
        config,
        json!({"source": {"type": "glossary", "owner": "mjames"}})
    );
}

#[test]
fn rejects_unsupported_extension() {
    let err = load_config_file("glossary.json", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFileType(ext) if ext == ".json"));
}

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");
    let err = load_config_file(path.to_str().unwrap(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::CannotOpen { .. }));
    assert!(err.to_string().contains("absent.yml"));
}

#[test]
fn remote_document_goes_through_fetch() {
    let config = load_config_file_with(
        "https://example.com/glossary.yml",
        &LoadOptions::default(),
        &StaticFetch("owner: ${GLOSSARY_OWNER}\n"),
        &env(),
    )
    .unwrap();
    assert_eq!(config, json!({"owner": "mjames"}));
}

#[test]
fn remote_failure_keeps_cause() {
    let err = load_config_file_with(
        "https://example.com/glossary.yml",
        &LoadOptions::default(),
        &FailingFetch,
        &ProcessEnv,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::RemoteFetch { .. }));
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("connection refused"));
}

#[test]
fn squirrels_original_config() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "owner: $GLOSSARY_OWNER").unwrap();

    let options = LoadOptions {
        squirrel_original_config: true,
        ..Default::default()
    };
    let config =
        load_config_file_with(file.path().to_str().unwrap(), &options, &FailingFetch, &env())
            .unwrap();
    assert_eq!(
        config,
        json!({
            "owner": "mjames",
            "__orig_config": {"owner": "$GLOSSARY_OWNER"}
        })
    );
}
