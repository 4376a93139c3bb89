//! Batch output file parsing
//!
//! Output files are newline-delimited JSON. Each line is either a flat result
//! object or the Batch API envelope wrapping a chat completion whose message
//! content is the flat result object.

use serde::Deserialize;
use serde_json::Value;

use super::types::BatchResult;
use crate::utils::error::FanoutError;

/// A request inside the batch that the remote side reported as failed
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRequest {
    /// Line number in the output file (1-based)
    pub line: usize,
    /// Correlation ID of the failed request, when present
    pub custom_id: Option<String>,
    /// Error description
    pub reason: String,
}

/// Decoded output file
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    /// Successfully decoded results, in file order
    pub results: Vec<BatchResult>,
    /// Well-formed envelopes whose request failed remotely
    pub failed_requests: Vec<FailedRequest>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    custom_id: Option<String>,
    #[serde(default)]
    response: Option<EnvelopeResponse>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResponse {
    status_code: u16,
    #[serde(default)]
    body: Value,
}

/// Parse a whole output file.
///
/// Parsing is all-or-nothing: the first malformed line fails the file.
/// Blank lines are skipped.
pub fn parse_batch_output(content: &[u8]) -> Result<ParsedOutput, FanoutError> {
    let mut output = ParsedOutput::default();

    for (index, raw) in content.split(|b| *b == b'\n').enumerate() {
        let line = index + 1;
        let raw = raw.trim_ascii();
        if raw.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_slice(raw).map_err(|e| FanoutError::Parse {
            line,
            message: e.to_string(),
        })?;

        if value.get("word").is_some() {
            output.results.push(decode_result(value, line)?);
            continue;
        }

        if value.get("custom_id").is_none() {
            return Err(FanoutError::Parse {
                line,
                message: "line is neither a result nor a batch envelope".to_string(),
            });
        }

        let envelope: Envelope = serde_json::from_value(value).map_err(|e| FanoutError::Parse {
            line,
            message: e.to_string(),
        })?;

        match unwrap_envelope(envelope, line)? {
            Ok(result) => output.results.push(result),
            Err(failed) => output.failed_requests.push(failed),
        }
    }

    Ok(output)
}

fn decode_result(value: Value, line: usize) -> Result<BatchResult, FanoutError> {
    serde_json::from_value(value).map_err(|e| FanoutError::Parse {
        line,
        message: e.to_string(),
    })
}

/// The outer error is a malformed line; the inner error is a request the
/// remote side failed.
fn unwrap_envelope(
    envelope: Envelope,
    line: usize,
) -> Result<Result<BatchResult, FailedRequest>, FanoutError> {
    let failed = |reason: String| FailedRequest {
        line,
        custom_id: envelope.custom_id.clone(),
        reason,
    };

    if let Some(error) = envelope.error.as_ref().filter(|e| !e.is_null()) {
        return Ok(Err(failed(error.to_string())));
    }

    let Some(response) = envelope.response.as_ref() else {
        return Ok(Err(failed("envelope has neither response nor error".to_string())));
    };

    if !(200..300).contains(&response.status_code) {
        return Ok(Err(failed(format!(
            "request returned status {}",
            response.status_code
        ))));
    }

    let content = response
        .body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| FanoutError::Parse {
            line,
            message: "response body has no message content".to_string(),
        })?;

    let result: BatchResult =
        serde_json::from_str(strip_code_fence(content)).map_err(|e| FanoutError::Parse {
            line,
            message: format!("message content is not a result: {}", e),
        })?;

    Ok(Ok(result))
}

/// Models sometimes wrap JSON answers in a markdown fence
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
