pub mod catalog;
pub mod expectations;

use crate::logic::SimulationPlan;
use catalog::{catalog_scenarios, find_catalog_scenario};

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "real-game" | "full" => "full-game".to_string(),
        "scoring" => "scoring-table".to_string(),
        "cap" => "auto-assign-cap".to_string(),
        "cycle" => "scenario-cycle".to_string(),
        "adaptive" => "strategy-adaptive".to_string(),
        "contrarian" => "strategy-contrarian".to_string(),
        "random" => "strategy-random".to_string(),
        other => other.to_string(),
    };
    find_catalog_scenario(&key).map(|entry| TestScenario::simulation(entry.name, entry.plan))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .into_iter()
        .map(|entry| (entry.key, entry.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        let listed = list_scenarios();
        assert_eq!(listed.len(), 9);
        for (key, name) in listed {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, name);
            assert!(!scenario.plan.expectations.is_empty());
        }
    }

    #[test]
    fn aliases_and_unknown_names() {
        assert_eq!(get_scenario("Scoring").unwrap().name, "Scoring Table Verification");
        assert!(get_scenario("weather-effects").is_none());
    }
}
