//! Google Docs/Drive type definitions
//!
//! The persisted credential record, token endpoint payloads, and the subset of
//! Docs/Drive request and response shapes the bridge touches.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// Tokens expiring within this window are treated as already expired
pub const EXPIRY_SKEW_SECS: i64 = 300;

/// Persisted OAuth credential record for the single authorized user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Access token
    #[serde(alias = "token")]
    pub access_token: String,

    /// Refresh token, absent when the provider did not issue one
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Access token expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    /// Granted scopes
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Token endpoint used for refresh
    pub token_uri: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,
}

impl CredentialRecord {
    /// Whether the access token is expired (or about to be) at `now`.
    /// A record without an expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now >= expiry - Duration::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Fold a refresh response into this record.
    /// The refresh token is kept unless the provider rotated it.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.access_token = response.access_token;
        self.expiry = response.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope {
            self.scopes = split_scopes(&scope);
        }
    }
}

/// Split a space-delimited OAuth scope string
pub fn split_scopes(scope: &str) -> BTreeSet<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Token response from the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Document entry returned by `list_docs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSummary {
    pub id: String,
    pub name: String,
}

/// Drive `files.list` response
#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<DocSummary>,
}

/// Title and raw body of a document
#[derive(Debug, Clone, Serialize)]
pub struct DocContent {
    pub title: Option<String>,
    pub body: Option<Value>,
}

/// Result of a `documents.batchUpdate` call
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateResult {
    pub status: &'static str,
    pub updates: Option<Value>,
}

impl BatchUpdateResult {
    pub fn ok(updates: Option<Value>) -> Self {
        Self {
            status: "ok",
            updates,
        }
    }
}

/// Formatting that `format_range` can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Bold,
    Italic,
    Heading1,
}

impl FromStr for TextFormat {
    type Err = RpcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Self::Bold),
            "italic" => Ok(Self::Italic),
            "heading1" => Ok(Self::Heading1),
            other => Err(RpcError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl TextFormat {
    /// Build the single batch-update request applying this format
    pub fn to_request(self, start_index: i64, end_index: i64) -> DocsRequest {
        let range = Range {
            start_index,
            end_index,
        };

        match self {
            Self::Bold => DocsRequest::UpdateTextStyle {
                range,
                text_style: TextStyle {
                    bold: Some(true),
                    ..Default::default()
                },
                fields: "bold".to_string(),
            },
            Self::Italic => DocsRequest::UpdateTextStyle {
                range,
                text_style: TextStyle {
                    italic: Some(true),
                    ..Default::default()
                },
                fields: "italic".to_string(),
            },
            Self::Heading1 => DocsRequest::UpdateParagraphStyle {
                range,
                paragraph_style: ParagraphStyle {
                    named_style_type: "HEADING_1".to_string(),
                },
                fields: "namedStyleType".to_string(),
            },
        }
    }
}

/// `documents.batchUpdate` request body
#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<DocsRequest>,
}

/// A single Docs batch-update request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocsRequest {
    InsertText { location: Location, text: String },

    #[serde(rename_all = "camelCase")]
    UpdateTextStyle {
        range: Range,
        text_style: TextStyle,
        fields: String,
    },

    #[serde(rename_all = "camelCase")]
    UpdateParagraphStyle {
        range: Range,
        paragraph_style: ParagraphStyle,
        fields: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: String,
}
