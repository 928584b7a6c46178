//! Configuration loading tests

use std::fs;

use track_editor::config::EditorConfig;

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("track-editor-{}.toml", std::process::id()));
    fs::write(
        &path,
        "parent_page = \"/course/7\"\nenforce_limits_locally = true\nnotes_char_limit = 100\n",
    )
    .unwrap();

    let config = EditorConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.parent_page, "/course/7");
    assert!(config.enforce_limits_locally);
    assert_eq!(config.notes_char_limit, 100);
    assert_eq!(config.name_char_limit, 250);
}

#[test]
fn test_round_trip_through_toml() {
    let config = EditorConfig::with_parent_page("/experiments");
    let raw = toml::to_string(&config).unwrap();
    assert_eq!(EditorConfig::from_toml_str(&raw).unwrap(), config);
}

#[test]
fn test_empty_file_is_default() {
    assert_eq!(EditorConfig::from_toml_str("").unwrap(), EditorConfig::default());
}
