use chatterbox::persona::{self, from_json_str};
use chatterbox::{Catalog, ConfigError};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const CATALOG_JSON: &str = r#"{
  "personalities": {
    "friendly": {
      "name": "Friendly Assistant",
      "greeting": "Hi! What's up?",
      "system_prompt": "Be warm.",
      "responses": {
        "greet": ["Hey!", "Hello!", "Howdy!"],
        "default": ["Hi there!", "Tell me more."]
      }
    },
    "grumpy": {
      "name": "Grumpy Assistant",
      "greeting": "What.",
      "responses": { "default": ["Hmph."] }
    }
  },
  "patterns": [
    { "tag": "greet", "patterns": ["hello", "hi"] },
    { "tag": "bye", "patterns": ["bye", "see ya"] },
    { "tag": "greet", "patterns": ["howdy"] }
  ]
}"#;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_json_file() {
    let file = write_temp(".json", CATALOG_JSON);
    let catalog = persona::load(file.path()).unwrap();
    assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["friendly", "grumpy"]);
    assert_eq!(catalog.get("grumpy").unwrap().greeting, "What.");
}

#[test]
fn test_load_yaml_file() {
    let yaml = r#"
personalities:
  grumpy:
    name: Grumpy Assistant
    greeting: What.
    responses:
      default: ["Hmph."]
patterns:
  - tag: bye
    patterns: ["bye"]
"#;
    let file = write_temp(".yml", yaml);
    let catalog = persona::load(file.path()).unwrap();
    assert_eq!(catalog.patterns[0].tag, "bye");
}

#[test]
fn test_load_malformed_file_is_config_error() {
    let file = write_temp(".json", "{ \"personalities\": ");
    assert!(matches!(
        persona::load(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_round_trip_preserves_order() {
    let catalog = from_json_str(CATALOG_JSON).unwrap();
    let json = catalog.to_json_pretty().unwrap();
    let reloaded = from_json_str(&json).unwrap();

    assert_eq!(reloaded, catalog);
    let tags: Vec<&str> = reloaded.patterns.iter().map(|p| p.tag.as_str()).collect();
    assert_eq!(tags, vec!["greet", "bye", "greet"]);
    assert_eq!(
        reloaded.get("friendly").unwrap().responses["greet"],
        vec!["Hey!", "Hello!", "Howdy!"]
    );
}

#[test]
fn test_round_trip_omits_missing_system_prompt() {
    let catalog = from_json_str(CATALOG_JSON).unwrap();
    let value: serde_json::Value = serde_json::from_str(&catalog.to_json_pretty().unwrap()).unwrap();
    assert!(value["personalities"]["grumpy"].get("system_prompt").is_none());
    assert_eq!(value["personalities"]["friendly"]["system_prompt"], "Be warm.");
    assert!(value["personalities"]["friendly"].get("id").is_none());
}

#[test]
fn test_builtin_round_trips() {
    let catalog = Catalog::builtin();
    let reloaded = from_json_str(&catalog.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reloaded, catalog);
}
