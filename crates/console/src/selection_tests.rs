// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn roundtrip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SelectionStore::new(dir.path().to_path_buf());

    assert!(store.load_selected().is_empty());
    store.save_selected(&["w-1".to_owned(), "w-2".to_owned()]);
    assert_eq!(store.load_selected(), ["w-1", "w-2"]);
    Ok(())
}

#[test]
fn corrupt_selection_is_cleared_and_treated_as_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(SELECTION_FILE);
    std::fs::write(&path, "{not json")?;

    let store = SelectionStore::new(dir.path().to_path_buf());
    assert!(store.load_selected().is_empty());
    assert!(!path.exists(), "corrupt selection file should have been removed");
    Ok(())
}

#[test]
fn empty_selection_removes_the_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SelectionStore::new(dir.path().to_path_buf());

    store.save_selected(&["w-1".to_owned()]);
    assert!(dir.path().join(SELECTION_FILE).exists());

    store.save_selected(&[]);
    assert!(!dir.path().join(SELECTION_FILE).exists());
    assert!(store.load_selected().is_empty());
    Ok(())
}

#[test]
fn show_schedule_flag_roundtrip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SelectionStore::new(dir.path().to_path_buf());

    assert!(!store.show_schedule());
    store.set_show_schedule(true);
    assert!(store.show_schedule());
    store.set_show_schedule(false);
    assert!(!store.show_schedule());
    Ok(())
}
