//! Shared scenario state for the generation scenarios.

use configurable_task_gen::GenerationOutput;
use configurable_task_gen::model::{AnnotatedType, HostType};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Snapshot under construction and the output of the last run.
#[derive(Debug, Default, ScenarioState)]
pub struct GenerationState {
    pub annotated: Slot<Vec<AnnotatedType>>,
    pub hosts: Slot<Vec<HostType>>,
    pub output: Slot<GenerationOutput>,
}

/// Fresh state for each scenario.
#[fixture]
pub fn generation_state() -> GenerationState {
    GenerationState::default()
}
