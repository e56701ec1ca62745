use crate::types::GenerationRequest;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_request(json: &str) -> Result<GenerationRequest, ParseError> {
    Ok(serde_json::from_str(json)?)
}
