//! Enrichment of bare infinitives into full verb cards.
//!
//! The gateway is all-or-nothing: a response is only accepted when every
//! requested infinitive comes back exactly once with a well-formed record.

use std::collections::HashMap;
use std::time::Duration;

use itertools::Itertools;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::verb::{Auxiliary, VerbRecord};

/// Message shown to the user whenever enrichment fails
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load verb data. Please check your API key.";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrichmentError {
    #[error("no API key found in ${0}")]
    MissingApiKey(String),
    #[error("enrichment request failed with status {0}")]
    HttpStatus(StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("enrichment returned an empty response")]
    EmptyResponse,
    #[error("malformed enrichment response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Source of verb cards for a list of infinitives
pub trait Enricher: Send + 'static {
    fn enrich(&self, infinitives: &[String]) -> Result<Vec<VerbRecord>, EnrichmentError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Resolve settings from the app config, reading the API key from the environment
    pub fn from_config(config: &Config) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            api_base: config.api_base.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// Enricher backed by the Gemini `generateContent` endpoint with a JSON response schema
pub struct GeminiEnricher {
    config: GeminiConfig,
}

impl GeminiEnricher {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }
}

impl Enricher for GeminiEnricher {
    fn enrich(&self, infinitives: &[String]) -> Result<Vec<VerbRecord>, EnrichmentError> {
        if infinitives.is_empty() {
            tracing::debug!("no verbs to enrich, skipping request");
            return Ok(Vec::new());
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| EnrichmentError::MissingApiKey(self.config.api_key_env.clone()))?;

        let client = Client::builder().timeout(self.config.timeout).build()?;
        let url = self.config.endpoint();
        tracing::info!(%url, verbs = infinitives.len(), "requesting verb enrichment");

        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&build_request(infinitives))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "enrichment request rejected");
            return Err(EnrichmentError::HttpStatus(status));
        }

        let body: GenerateResponse = response.json()?;
        let text = body.text().ok_or(EnrichmentError::EmptyResponse)?;
        let records = parse_verb_records(&text, infinitives)?;
        tracing::info!(verbs = records.len(), "verb enrichment complete");
        Ok(records)
    }
}

fn build_prompt(infinitives: &[String]) -> String {
    format!(
        "You are a German language expert.\n\
         I have a list of German verbs: \"{}\".\n\n\
         Please convert this list into a structured JSON array.\n\
         For each verb, provide:\n\
         1. The infinitive, exactly as provided.\n\
         2. The correct auxiliary verb for Partizip II (Perfekt) - strictly 'hat' or 'ist'.\n\
         3. The Partizip II form (e.g., 'geschlafen').\n\
         4. The Chinese translation (meaning).\n",
        infinitives.join(" ")
    )
}

/// Request body for `generateContent`, including the response schema
pub fn build_request(infinitives: &[String]) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": build_prompt(infinitives) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "infinitive": { "type": "STRING" },
                        "auxiliary": { "type": "STRING", "enum": ["hat", "ist"] },
                        "participle": { "type": "STRING" },
                        "chinese": { "type": "STRING" }
                    },
                    "required": ["infinitive", "auxiliary", "participle", "chinese"]
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// One verb as it appears on the wire
#[derive(Debug, Deserialize)]
struct WireVerb {
    infinitive: String,
    auxiliary: Auxiliary,
    participle: String,
    chinese: String,
}

impl From<WireVerb> for VerbRecord {
    fn from(wire: WireVerb) -> Self {
        VerbRecord {
            infinitive: wire.infinitive,
            auxiliary: wire.auxiliary,
            participle: wire.participle,
            translation: wire.chinese,
        }
    }
}

/// Decode and validate an enrichment payload against the requested infinitives.
///
/// Returns the records in the order they were requested.
pub fn parse_verb_records(
    text: &str,
    requested: &[String],
) -> Result<Vec<VerbRecord>, EnrichmentError> {
    let wire: Vec<WireVerb> = serde_json::from_str(text)?;
    if wire.is_empty() {
        return Err(EnrichmentError::EmptyResponse);
    }

    if let Some(blank) = wire
        .iter()
        .find(|v| v.infinitive.trim().is_empty() || v.participle.trim().is_empty())
    {
        return Err(EnrichmentError::Malformed(format!(
            "blank field in record for {:?}",
            blank.infinitive
        )));
    }

    if let Some(dup) = wire.iter().map(|v| v.infinitive.as_str()).duplicates().next() {
        return Err(EnrichmentError::Malformed(format!(
            "duplicate infinitive {dup}"
        )));
    }

    let mut by_infinitive: HashMap<String, WireVerb> = wire
        .into_iter()
        .map(|v| (v.infinitive.clone(), v))
        .collect();

    let mut records = Vec::with_capacity(requested.len());
    for infinitive in requested {
        match by_infinitive.remove(infinitive) {
            Some(v) => records.push(v.into()),
            None => {
                return Err(EnrichmentError::Malformed(format!(
                    "missing record for {infinitive}"
                )))
            }
        }
    }

    if !by_infinitive.is_empty() {
        let extra = by_infinitive.keys().sorted().join(", ");
        return Err(EnrichmentError::Malformed(format!(
            "unrequested infinitives: {extra}"
        )));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer a single HTTP request with `status` and `body`; the join handle
    /// yields the request head as received
    fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&lower);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            head
        });
        (format!("http://{addr}/v1beta"), handle)
    }

    fn local_enricher(api_base: String) -> GeminiEnricher {
        GeminiEnricher::new(GeminiConfig {
            api_base,
            api_key: Some("test-key".into()),
            api_key_env: "PARTIZIP_TEST_KEY".into(),
            model: "test-model".into(),
            timeout: Duration::from_secs(5),
        })
    }

    fn requested(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const VALID: &str = r#"[
        {"infinitive": "sein", "auxiliary": "ist", "participle": "gewesen", "chinese": "是"},
        {"infinitive": "gehen", "auxiliary": "ist", "participle": "gegangen", "chinese": "走"},
        {"infinitive": "schlafen", "auxiliary": "hat", "participle": "geschlafen", "chinese": "睡觉"}
    ]"#;

    #[test]
    fn parses_records_in_requested_order() {
        let records =
            parse_verb_records(VALID, &requested(&["schlafen", "gehen", "sein"])).unwrap();

        let order: Vec<&str> = records.iter().map(|r| r.infinitive.as_str()).collect();
        assert_eq!(order, vec!["schlafen", "gehen", "sein"]);
        assert_eq!(records[0].auxiliary, Auxiliary::Hat);
        assert_eq!(records[0].participle, "geschlafen");
        assert_eq!(records[0].translation, "睡觉");
    }

    #[test]
    fn rejects_out_of_enum_auxiliary() {
        let text = r#"[{"infinitive": "gehen", "auxiliary": "sein", "participle": "gegangen", "chinese": "走"}]"#;
        let err = parse_verb_records(text, &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Decode(_));
    }

    #[test]
    fn rejects_missing_field() {
        let text = r#"[{"infinitive": "gehen", "auxiliary": "ist", "chinese": "走"}]"#;
        let err = parse_verb_records(text, &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Decode(_));
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = parse_verb_records(r#"{"verbs": []}"#, &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Decode(_));
    }

    #[test]
    fn rejects_empty_array() {
        let err = parse_verb_records("[]", &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::EmptyResponse);
    }

    #[test]
    fn rejects_blank_participle() {
        let text = r#"[{"infinitive": "gehen", "auxiliary": "ist", "participle": " ", "chinese": "走"}]"#;
        let err = parse_verb_records(text, &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Malformed(_));
    }

    #[test]
    fn rejects_missing_requested_verb() {
        let err = parse_verb_records(VALID, &requested(&["schlafen", "gehen", "sein", "tun"]))
            .unwrap_err();
        assert_matches!(err, EnrichmentError::Malformed(msg) if msg.contains("tun"));
    }

    #[test]
    fn rejects_unrequested_verb() {
        let err = parse_verb_records(VALID, &requested(&["schlafen", "gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Malformed(msg) if msg.contains("sein"));
    }

    #[test]
    fn rejects_duplicate_verb() {
        let text = r#"[
            {"infinitive": "gehen", "auxiliary": "ist", "participle": "gegangen", "chinese": "走"},
            {"infinitive": "gehen", "auxiliary": "ist", "participle": "gegangen", "chinese": "走"}
        ]"#;
        let err = parse_verb_records(text, &requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::Malformed(msg) if msg.contains("duplicate"));
    }

    #[test]
    fn request_carries_prompt_and_schema() {
        let body = build_request(&requested(&["gehen", "sein"]));

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"gehen sein\""));

        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(
            schema["items"]["properties"]["auxiliary"]["enum"],
            json!(["hat", "ist"])
        );
        assert_eq!(schema["items"]["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[{\"a\":" }, { "text": "1}]" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("[{\"a\":1}]"));
    }

    #[test]
    fn response_without_text_is_empty() {
        let body: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(body.text(), None);

        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        }))
        .unwrap();
        assert_eq!(body.text(), None);
    }

    #[test]
    fn missing_api_key_fails_before_any_request() {
        let enricher = GeminiEnricher::new(GeminiConfig {
            api_base: "http://127.0.0.1:9".into(),
            api_key: None,
            api_key_env: "PARTIZIP_TEST_KEY".into(),
            model: "test-model".into(),
            timeout: Duration::from_millis(10),
        });
        let err = enricher.enrich(&requested(&["gehen"])).unwrap_err();
        assert_matches!(err, EnrichmentError::MissingApiKey(var) if var == "PARTIZIP_TEST_KEY");
    }

    #[test]
    fn empty_verb_list_needs_no_request() {
        let enricher = GeminiEnricher::new(GeminiConfig {
            api_base: "http://127.0.0.1:9".into(),
            api_key: None,
            api_key_env: "PARTIZIP_TEST_KEY".into(),
            model: "test-model".into(),
            timeout: Duration::from_millis(10),
        });
        assert!(enricher.enrich(&[]).unwrap().is_empty());
    }

    #[test]
    fn rejected_request_maps_to_http_status() {
        let (api_base, server) = serve_once(
            "401 Unauthorized",
            r#"{"error": {"code": 401, "message": "API key not valid"}}"#.to_string(),
        );

        let err = local_enricher(api_base)
            .enrich(&requested(&["gehen"]))
            .unwrap_err();
        assert_matches!(err, EnrichmentError::HttpStatus(status) if status == StatusCode::UNAUTHORIZED);

        let head = server.join().unwrap();
        assert!(head.starts_with("post /v1beta/models/test-model:generatecontent"));
        assert!(head.contains("x-goog-api-key: test-key"));
    }

    #[test]
    fn successful_request_yields_validated_records() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": VALID }] } }]
        })
        .to_string();
        let (api_base, server) = serve_once("200 OK", body);

        let records = local_enricher(api_base)
            .enrich(&requested(&["gehen", "sein", "schlafen"]))
            .unwrap();
        server.join().unwrap();

        let order: Vec<&str> = records.iter().map(|r| r.infinitive.as_str()).collect();
        assert_eq!(order, vec!["gehen", "sein", "schlafen"]);
        assert_eq!(records[1].auxiliary, Auxiliary::Ist);
        assert_eq!(records[1].participle, "gewesen");
    }

    #[test]
    fn successful_request_with_mismatched_verbs_is_malformed() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": VALID }] } }]
        })
        .to_string();
        let (api_base, server) = serve_once("200 OK", body);

        let err = local_enricher(api_base)
            .enrich(&requested(&["gehen"]))
            .unwrap_err();
        server.join().unwrap();
        assert_matches!(err, EnrichmentError::Malformed(_));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = GeminiConfig {
            api_base: "https://example.test/v1beta/".into(),
            api_key: None,
            api_key_env: "KEY".into(),
            model: "m".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(
            config.endpoint(),
            "https://example.test/v1beta/models/m:generateContent"
        );
    }
}
