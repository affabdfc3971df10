//! Strategy step resolution.
//!
//! Steps store their capacity/traffic values as text; resolving a step
//! validates the index and parses every value up front, so a malformed
//! strategy fails before any gate is evaluated.

use flotilla_core::{Error, ErrorKind, Result, RolloutStrategy, StepValue};

/// Parsed per-role values of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleValues {
    pub incumbent: u32,
    pub contender: u32,
}

/// The step a contender is currently targeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub index: u32,
    pub name: String,
    pub capacity: RoleValues,
    pub traffic: RoleValues,
    /// Whether this is the final step of the strategy.
    pub is_last: bool,
}

/// Resolve `target_step` against `strategy`.
///
/// `subject` names the release in error messages.
pub fn resolve_step(strategy: &RolloutStrategy, target_step: i32, subject: &str) -> Result<ResolvedStep> {
    let index = usize::try_from(target_step)
        .ok()
        .filter(|i| *i < strategy.steps.len())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidStepIndex,
                subject,
                format!(
                    "target step {target_step} is outside a strategy of {} steps",
                    strategy.steps.len()
                ),
            )
        })?;

    let step = &strategy.steps[index];
    Ok(ResolvedStep {
        index: index as u32,
        name: step.name.clone(),
        capacity: parse_values(&step.capacity, "capacity", &step.name, subject)?,
        traffic: parse_values(&step.traffic, "traffic", &step.name, subject)?,
        is_last: index == strategy.last_step_index(),
    })
}

fn parse_values(value: &StepValue, field: &str, step: &str, subject: &str) -> Result<RoleValues> {
    Ok(RoleValues {
        incumbent: parse_percent(&value.incumbent, field, "incumbent", step, subject)?,
        contender: parse_percent(&value.contender, field, "contender", step, subject)?,
    })
}

fn parse_percent(raw: &str, field: &str, role: &str, step: &str, subject: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v <= 100 => Ok(v),
        _ => Err(Error::new(
            ErrorKind::InvalidStepValue,
            subject,
            format!("step {step:?}: {role} {field} {raw:?} is not an integer in 0..=100"),
        )),
    }
}
