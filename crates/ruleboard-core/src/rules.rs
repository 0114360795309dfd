//! Rules catalog: filtering, statistics and single-record updates.

use serde::Serialize;

use crate::store::{FlatFileStore, StoreError};
use crate::{Rule, RuleType, Section};

/// Search term plus optional section and type. All three must match.
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    pub search: String,
    pub section: Option<Section>,
    pub rule_type: Option<RuleType>,
}

impl RuleFilter {
    pub fn matches(&self, rule: &Rule) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = term.is_empty()
            || rule.title.to_lowercase().contains(&term)
            || rule.description.to_lowercase().contains(&term)
            || rule.id.to_lowercase().contains(&term)
            || rule
                .indicators
                .iter()
                .any(|ind| ind.to_lowercase().contains(&term));
        let matches_section = self.section.map_or(true, |s| rule.section == s);
        let matches_type = self.rule_type.map_or(true, |t| rule.rule_type == t);
        matches_search && matches_section && matches_type
    }
}

pub fn filter<'a>(rules: &'a [Rule], filter: &RuleFilter) -> Vec<&'a Rule> {
    rules.iter().filter(|r| filter.matches(r)).collect()
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeCounts {
    pub total: usize,
    pub hard_logic: usize,
    pub ai_agents: usize,
    pub ai_rag: usize,
}

impl TypeCounts {
    fn add(&mut self, rule_type: RuleType) {
        self.total += 1;
        match rule_type {
            RuleType::HardLogic => self.hard_logic += 1,
            RuleType::AiAgents => self.ai_agents += 1,
            RuleType::AiRag => self.ai_rag += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionStats {
    pub section: Section,
    #[serde(flatten)]
    pub counts: TypeCounts,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub sections: Vec<SectionStats>,
    #[serde(flatten)]
    pub overall: TypeCounts,
}

impl CatalogStats {
    pub fn section(&self, section: Section) -> &TypeCounts {
        &self.sections[section.index()].counts
    }
}

/// Recomputed from scratch on every call.
pub fn stats(rules: &[Rule]) -> CatalogStats {
    let mut sections: Vec<SectionStats> = Section::ALL
        .iter()
        .map(|&section| SectionStats {
            section,
            counts: TypeCounts::default(),
        })
        .collect();
    let mut overall = TypeCounts::default();
    for rule in rules {
        overall.add(rule.rule_type);
        sections[rule.section.index()].counts.add(rule.rule_type);
    }
    CatalogStats { sections, overall }
}

/// Replace one record by id and rewrite the whole collection.
pub fn save_one(store: &FlatFileStore, rule: Rule) -> Result<Vec<Rule>, StoreError> {
    let mut rules = store.load_rules();
    let slot = rules
        .iter_mut()
        .find(|r| r.id == rule.id)
        .ok_or_else(|| StoreError::UnknownRule(rule.id.clone()))?;
    *slot = rule;
    store.save_rules(&rules)?;
    Ok(rules)
}
