use crate::scenario::scenario_model::AssertionResult;

/// Step position and assertion results of a running scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    pub current_step: usize,
    pub assertion_results: Vec<AssertionResult>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }
}
