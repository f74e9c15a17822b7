//! Walkthrough of the profile store
//!
//! Run with: `RUST_LOG=debug cargo run --example profiles_usage`

use serde_json::json;
use termprofiles::{ConfigSchema, ProfileStore, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let data_dir = tempfile::tempdir()?;
    let store = ProfileStore::init(
        StoreConfig::builder("x-terminal")
            .data_dir(data_dir.path())
            .schema(ConfigSchema::terminal())
            .with_env_prefix("XTERM")
            .build(),
    )?;

    let _reloads = store.on_did_reload_profiles(|profiles| {
        println!("reloaded {} profile(s)", profiles.len());
    });
    let _resets = store.on_did_reset_base_profile(|base| {
        println!("base profile reset, fontSize = {}", base["fontSize"]);
    });

    println!("=== Profiles file: {} ===", store.profiles_path().display());
    println!("Existing profiles: {:?}", store.profile_names().await?);

    // Create and read back
    store
        .set_profile("work", &json!({"shellCommand": "/bin/zsh", "cwd": "/srv/work"}))
        .await?;
    store
        .set_profile("home", &json!({"fontSize": 18, "colorScheme": "solarized"}))
        .await?;
    println!("Profiles: {:?}", store.profile_names().await?);

    let work = store.get_profile("work").await?;
    println!("work = {}", serde_json::to_string_pretty(&work)?);

    // Share as a URI and decode it again
    let url = store.generate_new_url_from_profile_data(&json!(work))?;
    println!("\n=== Share URI ===\n{url}");
    let decoded = store.create_profile_data_from_uri(url.as_str())?;
    println!("round trip equal: {}", decoded == store.sanitize_data(&json!(work)));

    // Diff two profiles
    let home = store.get_profile("home").await?;
    println!("\n=== work -> home ===");
    for (key, value) in store.diff_profiles(&work, &home) {
        println!("  {key}: {value}");
    }

    store.rename_profile("home", "personal").await?;
    store.delete_profile("work").await?;
    println!("\nProfiles after rename/delete: {:?}", store.profile_names().await?);

    store.reset_base_profile();
    store.reload_profiles().await?;

    Ok(())
}
