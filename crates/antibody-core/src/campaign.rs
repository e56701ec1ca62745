use antibody_explore::immune::driver::{SearchDriver, SearchError};
use antibody_ir::parse::parse_request;
use antibody_ir::types::GenerationRequest;

use crate::analytics::RunAnalytics;
use crate::limits::{validate_limits, EngineLimits, LimitViolation};
use crate::report::SuiteReport;

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Request parse error: {0}")]
    Parse(#[from] antibody_ir::parse::ParseError),

    #[error("Limit exceeded: {0}")]
    Limit(#[from] LimitViolation),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Parse a JSON request and generate its suite.
pub fn generate_json(json: &str, limits: &EngineLimits) -> Result<SuiteReport, CampaignError> {
    let request = parse_request(json)?;
    generate(&request, limits)
}

/// Check limits, run the search to completion and build the report.
///
/// Running out of iterations is not an error: the report carries the
/// partial suite and its coverage.
#[tracing::instrument(
    skip(request, limits),
    fields(
        parameters = request.parameters.len(),
        strength = request.search.strength,
        seed = request.search.seed,
    )
)]
pub fn generate(
    request: &GenerationRequest,
    limits: &EngineLimits,
) -> Result<SuiteReport, CampaignError> {
    validate_limits(request, limits)?;

    let driver = SearchDriver::new(request)?;
    let mut analytics = RunAnalytics::new();
    let outcome = driver.run(&mut analytics);

    Ok(SuiteReport::build(request, &outcome, analytics))
}
