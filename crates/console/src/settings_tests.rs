// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SETUP_YAML: &str = "\
own_urls:
  - http://10.0.0.5:8083/
  - http://farm.local:8083/
config:
  manager_name: Big Farm
  database_url: ''
  task_update_push_max_interval: 30s
";

#[test]
fn parses_the_setup_document() -> anyhow::Result<()> {
    let data = SetupData::parse(SETUP_YAML)?;
    assert_eq!(data.own_urls.len(), 2);
    assert_eq!(
        data.config.get("manager_name").and_then(serde_yaml::Value::as_str),
        Some("Big Farm"),
    );
    Ok(())
}

#[test]
fn parse_failure_reports_the_line() -> anyhow::Result<()> {
    let err = match SetupData::parse("config:\n  bad: [unclosed\n") {
        Err(e) => e,
        Ok(_) => anyhow::bail!("expected a parse failure"),
    };
    assert!(err.line.is_some());
    assert!(err.to_string().contains("line"));
    Ok(())
}

#[test]
fn apply_yaml_failure_keeps_current_state() -> anyhow::Result<()> {
    let data = SetupData::parse(SETUP_YAML)?;
    let mut editor = SettingsEditor::new(data.config);

    let before = editor.config().clone();
    assert!(editor.apply_yaml("{broken").is_err());
    assert_eq!(editor.config(), &before);
    assert!(!editor.is_dirty());
    Ok(())
}

#[test]
fn restore_returns_to_the_pristine_copy() -> anyhow::Result<()> {
    let data = SetupData::parse(SETUP_YAML)?;
    let mut editor = SettingsEditor::new(data.config);

    editor.apply_yaml("manager_name: Renamed Farm\n").map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(editor.is_dirty());

    editor.restore();
    assert!(!editor.is_dirty());
    assert_eq!(
        editor.config().get("manager_name").and_then(serde_yaml::Value::as_str),
        Some("Big Farm"),
    );
    Ok(())
}

#[test]
fn set_config_rebaselines() -> anyhow::Result<()> {
    let mut editor = SettingsEditor::new(serde_yaml::from_str("a: 1")?);
    editor.set_config(serde_yaml::from_str("a: 2")?);
    assert!(!editor.is_dirty());
    Ok(())
}

#[test]
fn config_yaml_roundtrips() -> anyhow::Result<()> {
    let data = SetupData::parse(SETUP_YAML)?;
    let editor = SettingsEditor::new(data.config.clone());

    let reparsed: serde_yaml::Value = serde_yaml::from_str(&editor.config_yaml()?)?;
    assert_eq!(reparsed, data.config);
    Ok(())
}

#[test]
fn placeholder_variable_rows_are_dropped() -> anyhow::Result<()> {
    let rows: Vec<serde_yaml::Value> = serde_yaml::from_str(
        "- {name: blender, value: /usr/bin/blender}\n\
         - {name: variable-name, value: variable-value}\n\
         - {name: ffmpeg, value: /usr/bin/ffmpeg}\n",
    )?;

    let kept = strip_placeholder_variables(rows);
    let names: Vec<&str> =
        kept.iter().filter_map(|r| r.get("name").and_then(serde_yaml::Value::as_str)).collect();
    assert_eq!(names, ["blender", "ffmpeg"]);
    Ok(())
}

#[yare::parameterized(
    empty_url = { "database_url: ''", "bundled" },
    missing_key = { "manager_name: x", "bundled" },
    external_url = { "database_url: mongodb://db.example.com/farm", "external" },
)]
fn database_choice_cases(config: &str, expected: &str) {
    let config: serde_yaml::Value = serde_yaml::from_str(config).unwrap_or_default();
    assert_eq!(database_choice(&config), expected);
}
