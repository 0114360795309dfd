//! Import of the regulator's rule table from its plain-text extraction.
//!
//! The extraction is one cell per line: a section name, then per rule its number, the
//! rule text (one or more lines), the classification, the reason (one or more lines)
//! and the risk level.

use tracing::debug;

use crate::{Rule, RuleType, Section};

const HEADER_CELLS: [&str; 5] = ["Rule No", "Rule", "Classification", "Reason", "Risk Level"];
const BANNERS: [&str; 4] = ["Hard Logic Rules:", "AI Rules", "AI-General:", "AI-RAG:"];
const RISK_LEVELS: [&str; 5] = ["High", "Med", "Low", "Low-Med", "Medium"];
const TITLE_LIMIT: usize = 60;

fn is_rule_number(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

fn is_classification(line: &str) -> bool {
    line.starts_with("Hard Logic") || line.starts_with("AI-")
}

fn is_risk(line: &str) -> bool {
    RISK_LEVELS.contains(&line)
        || line.starts_with("High")
        || line.starts_with("Med")
        || line.starts_with("Low")
}

fn classify(classification: &str) -> RuleType {
    if classification.contains("Hard Logic") {
        RuleType::HardLogic
    } else if classification.contains("AI-RAG") {
        RuleType::AiRag
    } else {
        // AI-General and any other AI-* label
        RuleType::AiAgents
    }
}

fn rule_id(section: Section, number: &str) -> String {
    let prefix: String = section.as_str().chars().take(2).collect();
    format!("{}-{:0>3}", prefix.to_uppercase(), number)
}

fn title_of(text: &str) -> String {
    if text.chars().count() > TITLE_LIMIT {
        let cut: String = text.chars().take(TITLE_LIMIT).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Parse extracted text into rule records. Rules seen before any section heading, or
/// missing either text or classification, are dropped.
pub fn parse_rules_text(raw: &str) -> Vec<Rule> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let is_boundary = |line: &str| is_rule_number(line) || Section::parse(line).is_some();

    let mut section: Option<Section> = None;
    let mut rules = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(s) = Section::parse(line) {
            section = Some(s);
            i += 1;
            continue;
        }
        if HEADER_CELLS.contains(&line) || BANNERS.iter().any(|b| line.contains(b)) {
            i += 1;
            continue;
        }
        if !is_rule_number(line) {
            i += 1;
            continue;
        }

        let number = line;
        let mut ptr = i + 1;

        let mut text = Vec::new();
        let mut classification = None;
        while ptr < lines.len() {
            let l = lines[ptr];
            if is_classification(l) {
                classification = Some(l);
                ptr += 1;
                break;
            }
            if is_boundary(l) {
                break;
            }
            text.push(l);
            ptr += 1;
        }

        let mut reason = Vec::new();
        let mut risk = None;
        if classification.is_some() {
            while ptr < lines.len() {
                let l = lines[ptr];
                if is_risk(l) {
                    risk = Some(l);
                    ptr += 1;
                    break;
                }
                if is_boundary(l) {
                    break;
                }
                reason.push(l);
                ptr += 1;
            }
        }

        let text = text.join(" ");
        match (section, classification) {
            (Some(section), Some(classification)) if !text.is_empty() => {
                let reason = reason.join(" ");
                rules.push(Rule {
                    id: rule_id(section, number),
                    title: title_of(&text),
                    description: text,
                    indicators: if reason.is_empty() { vec![] } else { vec![reason] },
                    section,
                    rule_type: classify(classification),
                    risk: risk.unwrap_or("Unknown").to_string(),
                });
                i = ptr;
            }
            _ => {
                debug!(number, "skipping incomplete rule row");
                i += 1;
            }
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
Credit
Rule No
Rule
Classification
Reason
Risk Level
Hard Logic Rules:
1
Loan repaid in full within ninety days of disbursement by a party
other than the borrower or guarantor
Hard Logic
Repayment source differs
from borrower
High
2
Loan proceeds diverted
AI-General
Needs counterparty context
Med
Trade
7
Unit price far from reference
AI-RAG (evidence)
Low-Med
";

    #[test]
    fn parses_multi_line_cells_into_records() {
        let rules = parse_rules_text(SAMPLE);
        assert_eq!(rules.len(), 3);

        let first = &rules[0];
        assert_eq!(first.id, "CR-001");
        assert_eq!(first.section, Section::Credit);
        assert_eq!(first.rule_type, RuleType::HardLogic);
        assert_eq!(first.risk, "High");
        assert_eq!(
            first.description,
            "Loan repaid in full within ninety days of disbursement by a party other than the borrower or guarantor"
        );
        assert!(first.title.ends_with("..."));
        assert_eq!(first.title.chars().count(), TITLE_LIMIT + 3);
        assert_eq!(first.indicators, vec!["Repayment source differs from borrower".to_string()]);
    }

    #[test]
    fn maps_classifications_and_sections() {
        let rules = parse_rules_text(SAMPLE);
        assert_eq!(rules[1].rule_type, RuleType::AiAgents);
        assert_eq!(rules[1].title, "Loan proceeds diverted");
        assert_eq!(rules[2].id, "TR-007");
        assert_eq!(rules[2].rule_type, RuleType::AiRag);
        assert!(rules[2].indicators.is_empty());
        assert_eq!(rules[2].risk, "Low-Med");
    }

    #[test]
    fn missing_risk_defaults_to_unknown() {
        let rules = parse_rules_text("Remittance\n3\nMany senders\nHard Logic\nFan-in pattern\n");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "RE-003");
        assert_eq!(rules[0].risk, "Unknown");
        assert_eq!(rules[0].indicators, vec!["Fan-in pattern".to_string()]);
    }

    #[test]
    fn rows_without_classification_or_section_are_dropped() {
        assert!(parse_rules_text("1\nOrphan rule\nHard Logic\nHigh\n").is_empty());
        assert!(parse_rules_text("Trade\n1\nNo class here\n2\n").is_empty());
    }
}
