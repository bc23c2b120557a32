/*
 *  kodinfo.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::collections::HashMap;

use log::debug;
use serde_json::{json, Value};

use crate::kodirpc::{KodiClient, KodiClientError};

/// Point-in-time label→value read of player/system state.
///
/// Absent labels and empty labels mean the same thing to the renderer, so
/// `get` returns `""` for both. Synthetic labels (e.g. `Panel.Summary`) can
/// be inserted by the display cycle before the snapshot is handed to the
/// field renderer; the snapshot is immutable for the rest of the pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoSnapshot {
    labels: HashMap<String, String>,
}

impl InfoSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a `XBMC.GetInfoLabels` result object.
    /// Non-string scalars (booleans, the odd number) are stringified.
    pub fn from_labels(value: &Value) -> Self {
        let mut labels = HashMap::new();
        if let Some(map) = value.as_object() {
            for (k, v) in map {
                let s = match v {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    _ => String::new(),
                };
                labels.insert(k.clone(), s);
            }
        }
        InfoSnapshot { labels }
    }

    /// Value for a label, `""` when missing.
    pub fn get(&self, label: &str) -> &str {
        self.labels.get(label).map(String::as_str).unwrap_or("")
    }

    /// True when the label is present with a non-empty value.
    pub fn is_filled(&self, label: &str) -> bool {
        !self.get(label).is_empty()
    }

    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.labels.insert(label.into(), value.into());
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The kind of player Kodi reports as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Audio,
    Video,
    Picture,
}

impl PlayerKind {
    fn from_type(t: &str) -> Option<Self> {
        match t {
            "audio" => Some(PlayerKind::Audio),
            "video" => Some(PlayerKind::Video),
            "picture" => Some(PlayerKind::Picture),
            _ => None,
        }
    }
}

/// One entry from `Player.GetActivePlayers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePlayer {
    pub player_id: i32,
    pub kind: PlayerKind,
}

/// Facade over the Kodi JSON-RPC surface the panel needs.
#[derive(Debug)]
pub struct KodiServer {
    base_url: String,
    client: KodiClient,
}

impl KodiServer {
    pub fn new(base_url: &str) -> Result<Self, KodiClientError> {
        Ok(KodiServer {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: KodiClient::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `JSONRPC.Ping`; true once Kodi answers "pong".
    pub async fn ping(&mut self) -> Result<bool, KodiClientError> {
        let result = self.client.call(&self.base_url, "JSONRPC.Ping", Value::Null).await?;
        Ok(result.as_str() == Some("pong"))
    }

    /// First reported active player, if any.
    pub async fn active_player(&mut self) -> Result<Option<ActivePlayer>, KodiClientError> {
        let result = self
            .client
            .call(&self.base_url, "Player.GetActivePlayers", Value::Null)
            .await?;

        let player = result.as_array().and_then(|players| {
            players.iter().find_map(|p| {
                let kind = p.get("type").and_then(Value::as_str).and_then(PlayerKind::from_type)?;
                let player_id = p.get("playerid").and_then(Value::as_i64)? as i32;
                Some(ActivePlayer { player_id, kind })
            })
        });
        Ok(player)
    }

    /// One batched `XBMC.GetInfoLabels` round trip.
    pub async fn info_labels(&mut self, labels: &[&str]) -> Result<InfoSnapshot, KodiClientError> {
        let params = json!({ "labels": labels });
        let result = self
            .client
            .call(&self.base_url, "XBMC.GetInfoLabels", params)
            .await?;
        Ok(InfoSnapshot::from_labels(&result))
    }

    /// The percentage property has to be fetched on its own; not every Kodi
    /// release folds it into the info-label surface.
    pub async fn playback_percent(&mut self, player_id: i32) -> Result<Option<f64>, KodiClientError> {
        let params = json!({ "playerid": player_id, "properties": ["percentage"] });
        let result = self
            .client
            .call(&self.base_url, "Player.GetProperties", params)
            .await?;
        Ok(result
            .get("percentage")
            .and_then(Value::as_f64)
            .map(|p| p / 100.0))
    }

    /// Resolve a virtual artwork path to a fetchable URL via
    /// `Files.PrepareDownload`. None when Kodi offers no download path.
    pub async fn prepare_download(&mut self, path: &str) -> Result<Option<String>, KodiClientError> {
        let params = json!({ "path": path });
        let result = self
            .client
            .call(&self.base_url, "Files.PrepareDownload", params)
            .await?;

        let url = result
            .pointer("/details/path")
            .and_then(Value::as_str)
            .map(|p| format!("{}/{}", self.base_url, p));
        debug!("artwork {} resolved to {:?}", path, url);
        Ok(url)
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, KodiClientError> {
        self.client.fetch_bytes(url).await
    }
}
