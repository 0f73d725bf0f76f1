//! Export, rebuild and re-export against a live Firebird server.
//!
//! Needs `DBMETA_TEST_CONNECTION` (source database connection string),
//! `DBMETA_TEST_DB_DIR` (directory the server can create databases in) and
//! the `FB_NEW_DB_*` variables. Run with `cargo test -- --ignored`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use dbmeta::{export_schema, firebird, Config, Orchestrator, ScriptCategory, ScriptWriter};

fn read_tree(root: &Path) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for category in ScriptCategory::ALL {
        for entry in fs::read_dir(category.dir(root)).unwrap() {
            let path = entry.unwrap().path();
            let key = format!(
                "{}/{}",
                category,
                path.file_name().unwrap().to_string_lossy()
            );
            files.insert(key, fs::read_to_string(&path).unwrap());
        }
    }
    files
}

#[test]
#[ignore = "requires a running Firebird server"]
fn test_export_build_export_roundtrip() {
    let (Ok(source), Ok(db_dir)) = (
        std::env::var("DBMETA_TEST_CONNECTION"),
        std::env::var("DBMETA_TEST_DB_DIR"),
    ) else {
        eprintln!("DBMETA_TEST_CONNECTION or DBMETA_TEST_DB_DIR not set, skipping");
        return;
    };

    let config = Config::from_lookup(|key| std::env::var(key).ok()).unwrap();
    let orchestrator = Orchestrator::new(config.clone());
    let work = tempfile::tempdir().unwrap();

    let first = work.path().join("first");
    let exported = orchestrator.export_scripts(Some(&source), &first).unwrap();

    let name = format!("dbmeta_roundtrip_{}", chrono::Utc::now().timestamp_millis());
    let target = Path::new(&db_dir).join(&name);
    let built = orchestrator
        .build_db(&target.to_string_lossy(), &first)
        .unwrap();
    assert_eq!(built.scripts_executed, exported.files.len());

    let db_path = fs::canonicalize(&db_dir)
        .unwrap()
        .join(format!("{}.fdb", name));
    let rebuilt = config
        .new_database
        .connection_for(db_path.to_string_lossy());

    let second = work.path().join("second");
    let mut conn = firebird::connect(&rebuilt).unwrap();
    export_schema(&mut conn, &ScriptWriter::new(&second)).unwrap();
    conn.close().unwrap();

    let before = read_tree(&first);
    let after = read_tree(&second);
    assert_eq!(
        before.keys().collect::<Vec<_>>(),
        after.keys().collect::<Vec<_>>()
    );
    for (file, text) in &before {
        if file.starts_with("procedures/") {
            continue;
        }
        assert_eq!(text, &after[file], "{} differs after rebuild", file);
    }
}
