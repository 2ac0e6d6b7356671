//! Default configuration values
//!
//! Every option the application reads has an entry here, so a fresh
//! store is always fully populated. Values loaded from disk are merged
//! on top of this table; unknown keys from disk are kept verbatim.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Default option table, keyed by category then option name.
static TABLE: Lazy<HashMap<String, HashMap<String, Value>>> = Lazy::new(build_table);

/// Snapshot of the default option table.
pub fn table() -> HashMap<String, HashMap<String, Value>> {
    TABLE.clone()
}

fn build_table() -> HashMap<String, HashMap<String, Value>> {
    let mut categories = HashMap::new();

    categories.insert(
        "general".to_string(),
        options(&[
            ("folder_recordings", json!("")),
            ("folder_cut", json!("")),
            ("folder_trash", json!("")),
            ("save_temp_files", json!(false)),
            ("rename_cut", json!(true)),
            ("delete_original", json!(false)),
            ("verify_decoded", json!(false)),
            // Index into the cut-action radio group
            ("cut_action", json!(0)),
            // Integer id of the preferred cutlist source
            ("cut_default", json!(0)),
            ("snippets", json!("")),
        ]),
    );

    categories.insert(
        "server".to_string(),
        options(&[
            ("url", json!("")),
            ("email", json!("")),
            // Stored base64-encoded; see EntryBinding's encode flag
            ("password", json!("")),
        ]),
    );

    categories.insert(
        "merge".to_string(),
        options(&[
            ("first_audio_stream", json!("MP2 Audio")),
            ("second_audio_stream", json!("AC3 Audio")),
            ("normalize_audio", json!("disabled")),
            ("normalize_volume", json!(100)),
            ("threads", json!(1)),
        ]),
    );

    categories
}

fn options(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
