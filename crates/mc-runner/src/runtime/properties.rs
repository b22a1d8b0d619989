// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `eula.txt` and `server.properties` materialization (`spec.md` §4.3 steps
//! 5-6, §6).

use std::collections::BTreeMap;
use std::path::Path;

use mc_core::InstanceConfig;
use tokio::fs;

use crate::error::Result;

/// The `server.properties` keys this adapter overwrites on every `create`.
/// Any other key read from an existing file is preserved byte-for-byte.
pub const MANAGED_KEYS: &[&str] = &[
    "difficulty",
    "max-players",
    "motd",
    "view-distance",
    "simulation-distance",
    "online-mode",
    "query.port",
    "spawn-protection",
];

/// Write `eula.txt` containing the literal `eula=true\n`.
pub async fn write_eula(data_dir: &Path) -> Result<()> {
    fs::write(data_dir.join("eula.txt"), "eula=true\n").await?;
    Ok(())
}

/// Read an existing `server.properties` (if any) into key/value pairs,
/// overwrite the managed keys derived from `name`/`config`/`max_players`,
/// and write the merged result back as flat `key=value\n` lines.
///
/// Foreign (non-managed) keys already present in the file are preserved
/// unchanged; blank lines and `#`-comments are not round-tripped (matching
/// the original's tolerant-read, flat-rewrite behavior).
pub async fn merge_server_properties(
    data_dir: &Path,
    name: &str,
    config: &InstanceConfig,
    max_players: i32,
) -> Result<()> {
    let path = data_dir.join("server.properties");

    let mut properties = match fs::read_to_string(&path).await {
        Ok(contents) => parse_properties(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(e.into()),
    };

    properties.insert("difficulty".to_string(), config.difficulty.clone());
    if max_players != 0 {
        properties.insert("max-players".to_string(), max_players.to_string());
    }
    properties.insert("motd".to_string(), name.to_string());
    properties.insert("view-distance".to_string(), config.view_distance.to_string());
    properties.insert(
        "simulation-distance".to_string(),
        config.simulation_distance.to_string(),
    );
    properties.insert("online-mode".to_string(), (!config.allow_pirate).to_string());
    properties.insert("query.port".to_string(), config.port.to_string());
    properties.insert("spawn-protection".to_string(), "0".to_string());

    let body = write_properties(&properties);
    fs::write(&path, body).await?;
    Ok(())
}

fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in contents.lines() {
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim();
            if key.is_empty() {
                continue;
            }
            let value = line[eq + 1..].trim();
            out.insert(key.to_string(), value.to_string());
        }
    }
    out
}

fn write_properties(properties: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (k, v) in properties {
        out.push_str(k);
        out.push('=');
        out.push_str(v);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::Snowflake;

    fn config() -> InstanceConfig {
        InstanceConfig {
            difficulty: "hard".into(),
            admin: Snowflake::from(1u64),
            port: 25566,
            view_distance: 10,
            simulation_distance: 8,
            allow_pirate: true,
            pvp: true,
        }
        .with_defaults()
    }

    #[tokio::test]
    async fn eula_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        write_eula(dir.path()).await.unwrap();
        let contents = fs::read_to_string(dir.path().join("eula.txt")).await.unwrap();
        assert_eq!(contents, "eula=true\n");
    }

    #[tokio::test]
    async fn merge_preserves_foreign_keys_and_overwrites_managed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("server.properties"),
            "level-seed=abc\ndifficulty=peaceful\nmax-players=4\n",
        )
        .await
        .unwrap();

        merge_server_properties(dir.path(), "My Server", &config(), 50)
            .await
            .unwrap();

        let contents = fs::read_to_string(dir.path().join("server.properties")).await.unwrap();
        let parsed = parse_properties(&contents);

        assert_eq!(parsed.get("level-seed").map(String::as_str), Some("abc"));
        assert_eq!(parsed.get("difficulty").map(String::as_str), Some("hard"));
        assert_eq!(parsed.get("max-players").map(String::as_str), Some("50"));
        assert_eq!(parsed.get("motd").map(String::as_str), Some("My Server"));
        assert_eq!(parsed.get("online-mode").map(String::as_str), Some("false"));
        assert_eq!(parsed.get("query.port").map(String::as_str), Some("25566"));
        assert_eq!(parsed.get("spawn-protection").map(String::as_str), Some("0"));
    }

    #[tokio::test]
    async fn merge_without_existing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        merge_server_properties(dir.path(), "Fresh", &config(), 0)
            .await
            .unwrap();

        let contents = fs::read_to_string(dir.path().join("server.properties")).await.unwrap();
        let parsed = parse_properties(&contents);
        assert!(!parsed.contains_key("max-players"));
        assert_eq!(parsed.get("motd").map(String::as_str), Some("Fresh"));
    }
}
