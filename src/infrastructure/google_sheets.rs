// Google Sheets repository implementation
use crate::application::sheet_repository::{SheetError, SheetRepository};
use crate::domain::credentials::ServiceAccountCredentials;
use crate::domain::source::{extract_sheet_id, SheetSource};
use crate::domain::table::SheetTable;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly https://www.googleapis.com/auth/drive.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<WorksheetMeta>,
}

#[derive(Debug, Deserialize)]
struct WorksheetMeta {
    properties: WorksheetProperties,
}

#[derive(Debug, Deserialize)]
struct WorksheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct GoogleSheetsRepository {
    client: reqwest::Client,
    api_base: String,
    tokens: RwLock<HashMap<String, CachedToken>>,
}

impl GoogleSheetsRepository {
    pub fn new(api_base: String, timeout: Duration) -> Result<Self, SheetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens: RwLock::new(HashMap::new()),
        })
    }

    /// Exchange a signed service-account assertion for an access token, cached
    /// per credential fingerprint until shortly before it expires
    async fn access_token(&self, credentials: &ServiceAccountCredentials) -> Result<String, SheetError> {
        let fingerprint = credentials.fingerprint();
        if let Some(cached) = self.tokens.read().await.get(&fingerprint) {
            if cached.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        let assertion = sign_assertion(credentials, chrono::Utc::now().timestamp())?;

        tracing::debug!("Requesting access token for {}", credentials.client_email);
        let response = self
            .client
            .post(&credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetError::Auth(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SheetError::Auth(format!("failed to parse token response: {}", e)))?;

        self.tokens.write().await.insert(
            fingerprint,
            CachedToken {
                access_token: token.access_token.clone(),
                expires_at: Instant::now() + Duration::from_secs(token.expires_in),
            },
        );

        Ok(token.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        sheet_id: &str,
        worksheet: Option<&str>,
    ) -> Result<T, SheetError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SheetError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &body, sheet_id, worksheet));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SheetError::Malformed(e.to_string()))
    }

    async fn first_worksheet_title(&self, token: &str, sheet_id: &str) -> Result<String, SheetError> {
        let url = format!(
            "{}/spreadsheets/{}?fields=sheets.properties.title",
            self.api_base, sheet_id
        );
        let meta: SpreadsheetMeta = self.get_json(&url, token, sheet_id, None).await?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| SheetError::Malformed(format!("spreadsheet '{}' has no worksheets", sheet_id)))
    }

    fn values_url(&self, sheet_id: &str, worksheet: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}?majorDimension=ROWS",
            self.api_base,
            sheet_id,
            urlencoding::encode(&quote_range(worksheet))
        )
    }
}

#[async_trait]
impl SheetRepository for GoogleSheetsRepository {
    async fn fetch_table(
        &self,
        credentials: &ServiceAccountCredentials,
        source: &SheetSource,
    ) -> Result<SheetTable, SheetError> {
        let sheet_id = extract_sheet_id(&source.sheet_id);
        let token = self.access_token(credentials).await?;

        let worksheet = match &source.worksheet {
            Some(name) => name.clone(),
            None => self.first_worksheet_title(&token, &sheet_id).await?,
        };

        let url = self.values_url(&sheet_id, &worksheet);
        tracing::debug!("Fetching {} rows from {}", source.key.as_str(), url);
        let range: ValueRange = self.get_json(&url, &token, &sheet_id, Some(&worksheet)).await?;

        let grid = range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(SheetTable::from_grid(grid))
    }

    async fn check_connection(&self, credentials: &ServiceAccountCredentials) -> Result<(), SheetError> {
        self.access_token(credentials).await.map(|_| ())
    }
}

fn sign_assertion(credentials: &ServiceAccountCredentials, now: i64) -> Result<String, SheetError> {
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| SheetError::Auth(format!("invalid private key: {}", e)))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(credentials.private_key_id.clone());

    let claims = AssertionClaims {
        iss: &credentials.client_email,
        scope: SCOPES,
        aud: &credentials.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    encode(&header, &claims, &key).map_err(|e| SheetError::Auth(format!("failed to sign assertion: {}", e)))
}

/// A1 range covering a whole worksheet; quotes are doubled inside the title
fn quote_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn map_error_status(status: StatusCode, body: &str, sheet_id: &str, worksheet: Option<&str>) -> SheetError {
    match (status, worksheet) {
        (StatusCode::NOT_FOUND, _) => SheetError::SpreadsheetNotFound(sheet_id.to_string()),
        (StatusCode::BAD_REQUEST, Some(ws)) if body.contains("Unable to parse range") => {
            SheetError::WorksheetNotFound(ws.to_string())
        }
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            SheetError::Auth(format!(
                "access to '{}' denied ({}), share it with the service account",
                sheet_id, status
            ))
        }
        _ => SheetError::Request(format!("status {}: {}", status, body)),
    }
}
