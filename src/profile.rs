//! Profile data types and the schema-driven helpers the store is built on
//!
//! A [`Profile`] is a JSON object keyed by schema field; a
//! [`ProfileCollection`] maps profile names to profiles. The collection is a
//! `BTreeMap`, so it is sorted by name whenever it is held or written.

use crate::config::ConfigSchema;
use crate::error::{Error, Result};

use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field key to value
pub type Profile = Map<String, Value>;

/// Profile name to profile, always sorted by name
pub type ProfileCollection = BTreeMap<String, Profile>;

/// Project `data` down to the schema's profile keys present in it
///
/// Anything that is not a JSON object sanitizes to an empty profile.
pub fn sanitize(schema: &ConfigSchema, data: &Value) -> Profile {
    match data.as_object() {
        Some(object) => sanitize_profile(schema, object),
        None => Profile::new(),
    }
}

/// [`sanitize`] for data that is already an object
pub fn sanitize_profile(schema: &ConfigSchema, data: &Profile) -> Profile {
    schema
        .profile_fields()
        .filter_map(|field| {
            data.get(field.key())
                .map(|value| (field.key().to_string(), value.clone()))
        })
        .collect()
}

/// Sanitize every profile of a collection
pub fn sanitize_collection(schema: &ConfigSchema, profiles: &ProfileCollection) -> ProfileCollection {
    profiles
        .iter()
        .map(|(name, profile)| (name.clone(), sanitize_profile(schema, profile)))
        .collect()
}

/// `base` with every key of `overlay` written over it
pub fn merge_under(base: &Profile, overlay: Profile) -> Profile {
    let mut merged = base.clone();
    merged.extend(overlay);
    merged
}

/// Keys of `new` that are absent from `old` or hold a different value
///
/// Keys removed in `new` are not reported.
pub fn diff(old: &Profile, new: &Profile) -> Profile {
    new.iter()
        .filter(|(key, value)| old.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Interpret a persisted document as a profile collection
///
/// Entries that are not objects are skipped with a warning.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document is not a JSON object.
pub fn parse_collection(document: Value) -> Result<ProfileCollection> {
    let Value::Object(entries) = document else {
        return Err(Error::Parse(format!(
            "expected a JSON object of profiles, found {}",
            json_kind(&document)
        )));
    };

    let mut profiles = ProfileCollection::new();
    for (name, entry) in entries {
        match entry {
            Value::Object(profile) => {
                profiles.insert(name, profile);
            }
            other => warn!(
                "Skipping profile '{name}': expected an object, found {}",
                json_kind(&other)
            ),
        }
    }
    Ok(profiles)
}

/// Render a collection as the persisted JSON document
pub fn collection_to_document(profiles: &ProfileCollection) -> Value {
    Value::Object(
        profiles
            .iter()
            .map(|(name, profile)| (name.clone(), Value::Object(profile.clone())))
            .collect(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
