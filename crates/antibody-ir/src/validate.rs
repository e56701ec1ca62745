use std::collections::{HashMap, HashSet};

use crate::types::{ForbiddenRule, GenerationRequest, ParameterSet, SearchConfig};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter set is empty")]
    NoParameters,

    #[error("Parameter '{parameter}' has an empty domain")]
    EmptyDomain { parameter: String },

    #[error("Parameter '{parameter}' lists value '{value}' more than once")]
    DuplicateValue { parameter: String, value: String },

    #[error("Strength must be at least 1")]
    ZeroStrength,

    #[error("Strength {strength} exceeds the number of parameters ({parameters})")]
    StrengthTooLarge { strength: usize, parameters: usize },

    #[error("Population size must be positive")]
    ZeroPopulation,

    #[error("Iteration budget must be positive")]
    ZeroIterations,

    #[error("Duplicate threshold {threshold} exceeds the number of parameters ({parameters})")]
    ThresholdTooLarge { threshold: usize, parameters: usize },

    #[error("Minimum mutation probability {value} is outside [0, 1]")]
    MutationFloorOutOfRange { value: f64 },

    #[error("Retry cap '{name}' must be positive")]
    ZeroRetryCap { name: &'static str },

    #[error("Forbidden rule #{rule} has no requirements and would forbid every test case")]
    EmptyRule { rule: usize },

    #[error("Forbidden rule #{rule} names position {position} but only {parameters} parameters exist")]
    RulePositionOutOfRange {
        rule: usize,
        position: usize,
        parameters: usize,
    },

    #[error("Forbidden rule #{rule} requires '{value}' at '{parameter}', which is not in its domain")]
    UnknownRuleValue {
        rule: usize,
        parameter: String,
        value: String,
    },

    #[error("Forbidden rule #{rule} requires two different values at position {position}")]
    ContradictoryRule { rule: usize, position: usize },
}

pub fn validate_request(request: &GenerationRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_parameters(&request.parameters, &mut errors);
    validate_search(&request.search, request.parameters.len(), &mut errors);
    validate_rules(&request.forbidden, &request.parameters, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every domain must be non-empty and free of repeated values.
fn validate_parameters(parameters: &ParameterSet, errors: &mut Vec<ValidationError>) {
    if parameters.is_empty() {
        errors.push(ValidationError::NoParameters);
        return;
    }
    for (position, domain) in parameters.parameters.iter().enumerate() {
        if domain.is_empty() {
            errors.push(ValidationError::EmptyDomain {
                parameter: parameters.label(position),
            });
            continue;
        }
        let mut seen = HashSet::new();
        for value in &domain.values {
            if !seen.insert(value.as_str()) {
                errors.push(ValidationError::DuplicateValue {
                    parameter: parameters.label(position),
                    value: value.clone(),
                });
            }
        }
    }
}

fn validate_search(config: &SearchConfig, parameters: usize, errors: &mut Vec<ValidationError>) {
    if config.strength == 0 {
        errors.push(ValidationError::ZeroStrength);
    } else if parameters > 0 && config.strength > parameters {
        errors.push(ValidationError::StrengthTooLarge {
            strength: config.strength,
            parameters,
        });
    }
    if config.population_size == 0 {
        errors.push(ValidationError::ZeroPopulation);
    }
    if config.max_iterations == 0 {
        errors.push(ValidationError::ZeroIterations);
    }
    if parameters > 0 && config.duplicate_threshold > parameters {
        errors.push(ValidationError::ThresholdTooLarge {
            threshold: config.duplicate_threshold,
            parameters,
        });
    }
    if !(0.0..=1.0).contains(&config.min_mutation_prob) {
        errors.push(ValidationError::MutationFloorOutOfRange {
            value: config.min_mutation_prob,
        });
    }
    if config.mutation_retry_cap == 0 {
        errors.push(ValidationError::ZeroRetryCap {
            name: "mutation_retry_cap",
        });
    }
    if config.init_retry_cap == 0 {
        errors.push(ValidationError::ZeroRetryCap {
            name: "init_retry_cap",
        });
    }
}

/// Rules must reference real positions and values and be satisfiable by some case.
fn validate_rules(
    rules: &[ForbiddenRule],
    parameters: &ParameterSet,
    errors: &mut Vec<ValidationError>,
) {
    for (rule_index, rule) in rules.iter().enumerate() {
        if rule.requirements.is_empty() {
            errors.push(ValidationError::EmptyRule { rule: rule_index });
            continue;
        }
        let mut pinned: HashMap<usize, &str> = HashMap::new();
        for req in &rule.requirements {
            let Some(domain) = parameters.parameters.get(req.position) else {
                errors.push(ValidationError::RulePositionOutOfRange {
                    rule: rule_index,
                    position: req.position,
                    parameters: parameters.len(),
                });
                continue;
            };
            if domain.index_of(&req.value).is_none() {
                errors.push(ValidationError::UnknownRuleValue {
                    rule: rule_index,
                    parameter: parameters.label(req.position),
                    value: req.value.clone(),
                });
            }
            match pinned.insert(req.position, req.value.as_str()) {
                Some(previous) if previous != req.value => {
                    errors.push(ValidationError::ContradictoryRule {
                        rule: rule_index,
                        position: req.position,
                    });
                }
                _ => {}
            }
        }
    }
}
