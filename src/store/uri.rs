//! Encoding profiles to and from `x-terminal://` URIs

use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::storage::StorageBackend;

use super::ProfileStore;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

/// Scheme and authority prefix of every profile URI
pub const X_TERMINAL_BASE_URI: &str = "x-terminal://";

fn invalid_uri(uri: &str, reason: impl ToString) -> Error {
    Error::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    }
}

impl<S: StorageBackend> ProfileStore<S> {
    /// A fresh `x-terminal://<uuid>/` URI with a random v4 id
    pub fn generate_new_uri(&self) -> String {
        format!("{X_TERMINAL_BASE_URI}{}/", Uuid::new_v4())
    }

    /// A fresh URI carrying `data` as query parameters.
    ///
    /// Only profile fields present in the sanitized data are encoded, each
    /// with its field's URL encoder. Absent fields are left out so the
    /// decoder falls back to the base profile for them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] if the generated URI does not parse.
    pub fn generate_new_url_from_profile_data(&self, data: &Value) -> Result<Url> {
        let data = self.sanitize_data(data);
        let uri = self.generate_new_uri();
        let mut url = Url::parse(&uri).map_err(|e| invalid_uri(&uri, e))?;

        if !data.is_empty() {
            let mut query = url.query_pairs_mut();
            for field in self.config.schema.profile_fields() {
                if let Some(value) = data.get(field.key()) {
                    query.append_pair(field.key(), &field.encode_param(value));
                }
            }
        }

        Ok(url)
    }

    /// Decode a profile from a URI's query parameters.
    ///
    /// Every profile field is decoded and validated with its field's codec.
    /// A parameter that is absent or empty, cannot be decoded, or fails
    /// validation takes the current base profile's value instead. Repeated
    /// parameters use their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] if `uri` is not a URI at all.
    pub fn create_profile_data_from_uri(&self, uri: &str) -> Result<Profile> {
        let url = Url::parse(uri).map_err(|e| invalid_uri(uri, e))?;

        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in url.query_pairs() {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        let base = self.get_base_profile();
        let profile = self
            .config
            .schema
            .profile_fields()
            .map(|field| {
                let key = field.key();
                let decoded = params
                    .get(key)
                    .filter(|param| !param.is_empty())
                    .and_then(|param| {
                        let value = field.decode_param(param);
                        if value.is_none() {
                            debug!("Parameter '{key}' in profile URI is invalid, using base value");
                        }
                        value
                    });
                let value = decoded
                    .or_else(|| base.get(key).cloned())
                    .unwrap_or_else(|| field.default_value().clone());
                (key.to_string(), value)
            })
            .collect();

        Ok(profile)
    }
}
