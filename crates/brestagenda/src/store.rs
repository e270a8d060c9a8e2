use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::Event;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: invalid event JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path) -> impl FnOnce(serde_json::Error) -> StoreError {
        move |source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `events` as a flat JSON array, replacing any existing file.
pub fn save_events(path: impl AsRef<Path>, events: &[Event]) -> Result<(), StoreError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(StoreError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, events).map_err(StoreError::json(path))?;
    writeln!(writer).map_err(StoreError::io(path))?;
    writer.flush().map_err(StoreError::io(path))?;
    log::info!("Wrote {} event(s) to {}", events.len(), path.display());
    Ok(())
}

pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<Event>, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(StoreError::io(path))?;
    let events: Vec<Event> =
        serde_json::from_reader(BufReader::new(file)).map_err(StoreError::json(path))?;
    log::debug!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn events() -> Vec<Event> {
        vec![
            Event {
                title: "Fête du port".to_string(),
                description: "Concerts".to_string(),
                category: "Festival".to_string(),
                link: "https://www.brest.fr/evt/1.html".to_string(),
                start: NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
                end: Some(NaiveDate::from_ymd_opt(2024, 7, 14).unwrap()),
            },
            Event {
                title: "Marché de nuit".to_string(),
                description: String::new(),
                category: String::new(),
                link: String::new(),
                start: NaiveDate::from_ymd_opt(2024, 8, 2).unwrap(),
                end: None,
            },
        ]
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        save_events(&path, &events()).unwrap();
        let loaded = load_events(&path).unwrap();

        assert_eq!(loaded, events());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "x".repeat(4096)).unwrap();

        save_events(&path, &events()[..1]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('[') && raw.trim_end().ends_with(']'));
        assert_eq!(load_events(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_legacy_zero_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"[{"Title":"t","Desc":"d","Category":"c","Link":"l","Start":"2024-07-12T00:00:00Z","End":"0001-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let loaded = load_events(&path).unwrap();

        assert_eq!(loaded[0].end, None);
        assert_eq!(
            loaded[0].start,
            NaiveDate::from_ymd_opt(2024, 7, 12).unwrap()
        );
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_events(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, StoreError::Io { .. }));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let bad = load_events(&path).unwrap_err();
        assert!(matches!(bad, StoreError::Json { .. }));
    }
}
