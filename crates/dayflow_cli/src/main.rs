//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dayflow_core` linkage and storage bootstrap outside any UI host.
//! - Print a deterministic summary of the loaded layouts.
//!
//! Usage: `dayflow_cli [db_path]`. Without a path an in-memory store is used.
//! Set `DAYFLOW_LOG_DIR` to an absolute path to enable file logging.

use dayflow_core::{
    core_version, default_log_level, init_logging, Editor, EditorConfig, KeyValueStore,
    SqliteStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dayflow_core version={}", core_version());

    if let Ok(log_dir) = std::env::var("DAYFLOW_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = match std::env::args().nth(1) {
        Some(path) => SqliteStore::open(&path),
        None => SqliteStore::open_in_memory(),
    };
    let store = match store {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    match Editor::open(store, EditorConfig::default()) {
        Ok(editor) => {
            print_summary(&editor);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("invalid editor config: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary<S: KeyValueStore>(editor: &Editor<S>) {
    for layout in editor.layouts() {
        println!(
            "layout id={} name={} nodes={}{}",
            layout.id,
            layout.name,
            layout.node_count,
            if layout.active { " active" } else { "" }
        );
    }
    println!("save_status={:?}", editor.save_status());
}
