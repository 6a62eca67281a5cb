use super::types::{ApiErrorBody, GenerateContentResponse};
use super::{Fragment, FragmentStream};
use crate::error::{ChatError, Result};
use eventsource_stream::{EventStreamError, Eventsource};
use futures::future;
use futures::stream::{self, Stream, StreamExt};

const EVENT_TERMINATOR: &[u8] = b"\n\n";

pub async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&error_text)
            .map(|body| body.error.describe())
            .unwrap_or(error_text);
        tracing::error!(
            status = %status,
            error = %detail,
            "API request failed"
        );
        return Err(ChatError::Api(format!(
            "API request failed with status {}: {}",
            status, detail
        )));
    }
    Ok(response)
}

fn parse_fragment(payload: &str) -> Result<Fragment> {
    let chunk: GenerateContentResponse = serde_json::from_str(payload)?;
    if let Some(error) = chunk.error {
        return Err(ChatError::Api(error.describe()));
    }
    if let Some(reason) = chunk
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        tracing::debug!(reason, "Candidate finished");
    }
    if let Some(reason) = chunk.block_reason() {
        tracing::warn!(reason, "Prompt was blocked by the API");
    }
    Ok(chunk.text())
}

fn stream_error(error: EventStreamError<ChatError>) -> ChatError {
    match error {
        EventStreamError::Transport(e) => e,
        other => {
            tracing::error!(error = %other, "Malformed event stream");
            ChatError::Api(format!("Malformed event stream: {}", other))
        }
    }
}

/// Turns a raw SSE byte stream into response fragments. A final event that
/// the server did not terminate with a blank line is still delivered.
pub fn fragment_stream<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: Into<ChatError>,
{
    let fragments = bytes
        .map(|chunk| -> Result<Vec<u8>> { chunk.map(|b| b.as_ref().to_vec()).map_err(Into::into) })
        .chain(stream::iter([Ok(EVENT_TERMINATOR.to_vec())]))
        .eventsource()
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) if event.data.is_empty() => None,
                Ok(event) => Some(parse_fragment(&event.data)),
                Err(e) => Some(Err(stream_error(e))),
            })
        });

    Box::pin(fragments)
}
