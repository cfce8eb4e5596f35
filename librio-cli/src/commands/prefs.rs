//! Preference commands

use anyhow::Result;
use librio_core::{CatalogStore, PreferenceKey, Preferences};

fn print_preferences(preferences: &Preferences, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(preferences)?);
    } else {
        for key in PreferenceKey::ALL {
            println!("{:<14} {}", key.as_str(), preferences.get(key));
        }
    }
    Ok(())
}

pub async fn prefs_show(store: &CatalogStore, json: bool) -> Result<()> {
    print_preferences(&store.preferences().await, json)
}

pub async fn prefs_set(store: &CatalogStore, key: &str, value: &str, json: bool) -> Result<()> {
    let preferences = store.set_preference(key, value).await?;
    print_preferences(&preferences, json)
}

pub async fn prefs_reset(store: &CatalogStore, json: bool) -> Result<()> {
    print_preferences(&store.reset_preferences().await, json)
}
