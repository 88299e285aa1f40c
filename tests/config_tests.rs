//! Loading `docql.toml` together with a `.env` file.
//!
//! Kept to a single test: `.env` values land in the process environment.

use std::time::Duration;

use docql::config::CONFIG_FILE_NAME;
use docql::docql_core::ParseMode;
use docql::{Config, Database, MemoryStore};
use tempfile::TempDir;

#[test]
fn test_load_file_env_and_save() {
    let dir = TempDir::new().unwrap();

    // from_file needs an existing file; load falls back to defaults
    let config = Config::from_file(&dir.path().join(CONFIG_FILE_NAME));
    assert!(config.is_err());

    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "database = \"shop\"\ntimeout_ms = 2500\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(".env"), "DOCQL_PARSE_MODE=strict\n").unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.database, "shop");
    assert_eq!(config.timeout(), Duration::from_millis(2500));
    assert_eq!(config.parse_mode, ParseMode::Strict);

    let db = Database::from_config(&config, MemoryStore::new());
    assert_eq!(db.name(), "shop");
    assert!(db.options().mode.is_strict());

    let out = TempDir::new().unwrap();
    config.save(out.path()).unwrap();
    let reloaded = Config::from_file(&out.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(reloaded, config);
}
