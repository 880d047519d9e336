use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Build a zip archive in memory from `(entry name, contents)` pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Chrome-for-Testing manifest JSON with one chromedriver entry per version.
pub fn manifest_json(base_url: &str, versions: &[(&str, &[&str])]) -> String {
    let versions: Vec<serde_json::Value> = versions
        .iter()
        .map(|(version, platforms)| {
            let downloads: Vec<serde_json::Value> = platforms
                .iter()
                .map(|platform| {
                    serde_json::json!({
                        "platform": platform,
                        "url": format!("{}/{}/{}/chromedriver-{}.zip", base_url, version, platform, platform),
                    })
                })
                .collect();
            serde_json::json!({
                "version": version,
                "revision": "1000",
                "downloads": { "chromedriver": downloads },
            })
        })
        .collect();

    serde_json::json!({
        "timestamp": "2024-01-01T00:00:00.000Z",
        "versions": versions,
    })
    .to_string()
}
