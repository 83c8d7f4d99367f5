use anyhow::{Context, Result};
use geojson::FeatureCollection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

/// Fixed resource name, resolved relative to the working directory
pub const DATA_FILE: &str = "map.geojson";

/// Read and parse the GeoJSON document. One attempt, no retry; any failure
/// (unreadable file or malformed document) aborts the pipeline before
/// classification, so no partial rendering can occur.
pub fn load_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("gagal membaca {}", path.display()))?;
    let collection = content
        .parse::<FeatureCollection>()
        .with_context(|| format!("gagal mengurai {}", path.display()))?;
    Ok(collection)
}

/// Load in the background. The single asynchronous boundary of the system:
/// the map stays interactive while the result travels back over the channel
/// and is picked up by the event loop. One such pipeline per map view.
pub fn spawn_load(path: PathBuf) -> mpsc::Receiver<Result<FeatureCollection>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // Receiver may be gone if the app quit before the load finished
        let _ = tx.send(load_feature_collection(&path));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("peta-sekolah-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_feature_collection(Path::new("does-not-exist.geojson"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_document_is_error() {
        let path = temp_path("malformed.geojson");
        fs::write(&path, "{\"type\": \"FeatureCollection\"").unwrap();
        assert!(load_feature_collection(&path).is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_valid_document_parses() {
        let path = temp_path("valid.geojson");
        fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"SDN": "SDN Menteng 01"},
                 "geometry": {"type": "Point", "coordinates": [106.92, -6.9]}}
            ]}"#,
        )
        .unwrap();
        let collection = load_feature_collection(&path).unwrap();
        assert_eq!(collection.features.len(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_spawned_load_delivers_over_channel() {
        let path = temp_path("spawned.geojson");
        fs::write(&path, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        let rx = spawn_load(path.clone());
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.unwrap().features.is_empty());
        fs::remove_file(&path).unwrap();
    }
}
