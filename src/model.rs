// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps an EPG channel key to that channel's programs, in no particular order.
pub type EpgMap = HashMap<String, Vec<Program>>;

/// A live channel as served by the channel list and playlist upload endpoints.
///
/// `name` doubles as the identity key since the server assigns no numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stream_url: String,
    #[serde(default)]
    pub epg_id: Option<String>,
}

impl Channel {
    /// Logo URL, treating an empty string as no logo.
    pub fn logo_url(&self) -> Option<&str> {
        non_empty(self.logo.as_deref())
    }

    pub fn category_name(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    /// Key under which this channel's programs are stored in the EPG map.
    pub fn epg_key(&self) -> String {
        match non_empty(self.epg_id.as_deref()) {
            Some(id) => id.to_string(),
            None => self.name.to_lowercase().replace(' ', "_"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of a playlist upload response. Failed uploads carry only `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub channels: Option<Vec<Channel>>,
    #[serde(default)]
    pub error: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, epg_id: Option<&str>) -> Channel {
        Channel {
            name: name.to_string(),
            logo: None,
            category: None,
            stream_url: String::new(),
            epg_id: epg_id.map(str::to_string),
        }
    }

    #[test]
    fn test_epg_key_prefers_epg_id() {
        assert_eq!(channel("BBC News", Some("bbcnews.uk")).epg_key(), "bbcnews.uk");
    }

    #[test]
    fn test_epg_key_normalizes_name() {
        assert_eq!(channel("Test Stream HD", None).epg_key(), "test_stream_hd");
        assert_eq!(channel("Test Stream", Some("")).epg_key(), "test_stream");
    }

    #[test]
    fn test_deserialize_channel_with_missing_fields() {
        let channel: Channel =
            serde_json::from_str(r#"{"name": "Test", "logo": "", "stream_url": "http://x/a.m3u8"}"#)
                .unwrap();
        assert_eq!(channel.logo_url(), None);
        assert_eq!(channel.category_name(), None);
        assert_eq!(channel.epg_id, None);
    }

    #[test]
    fn test_deserialize_failed_upload() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"error": "No valid channels found in playlist"}"#).unwrap();
        assert!(!response.success);
        assert!(response.channels.is_none());
        assert_eq!(
            response.error.as_deref(),
            Some("No valid channels found in playlist")
        );
    }
}
