use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use cohort_core::config::{TaxonomyConfig, TaxonomyEntry};

/// The closed sets of categorical labels the enrichment accepts: behavior
/// patterns, lifecycle stages, and playbook focuses (derived from allowed
/// triples) plus urgency labels. Immutable once constructed; share one
/// instance across all validation call sites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    behaviors: BTreeSet<String>,
    stages: BTreeSet<String>,
    focuses: BTreeSet<String>,
    urgency: BTreeSet<String>,
}

impl Taxonomy {
    pub fn new(
        allowed: impl IntoIterator<Item = (String, String, String)>,
        urgency: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut behaviors = BTreeSet::new();
        let mut stages = BTreeSet::new();
        let mut focuses = BTreeSet::new();
        for (behavior, stage, focus) in allowed {
            behaviors.insert(behavior);
            stages.insert(stage);
            focuses.insert(focus);
        }

        Self { behaviors, stages, focuses, urgency: urgency.into_iter().collect() }
    }

    pub fn from_config(config: &TaxonomyConfig) -> Self {
        Self::new(
            config.allowed.iter().map(|entry: &TaxonomyEntry| {
                (entry.behavior.clone(), entry.stage.clone(), entry.focus.clone())
            }),
            config.urgency.iter().cloned(),
        )
    }

    pub fn allows_behavior(&self, label: &str) -> bool {
        self.behaviors.contains(label)
    }

    pub fn allows_stage(&self, label: &str) -> bool {
        self.stages.contains(label)
    }

    pub fn allows_focus(&self, label: &str) -> bool {
        self.focuses.contains(label)
    }

    pub fn allows_urgency(&self, label: &str) -> bool {
        self.urgency.contains(label)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::from_config(&TaxonomyConfig::default())
    }
}
