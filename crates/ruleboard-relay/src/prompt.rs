use std::path::{Path, PathBuf};

use ruleboard_core::{Graph, Rule};
use tracing::warn;

const DEPENDENCY_TABLES: [&str; 2] = ["dependencies", "dev-dependencies"];

/// Dependency names from a Cargo manifest, comma-joined. A workspace root also
/// contributes the dependencies of its members; crates referenced by `path` are not
/// listed. `Unknown` when the manifest cannot be read or names nothing.
pub fn tech_stack(manifest: &Path) -> String {
    let Some(doc) = read_manifest(manifest) else {
        return "Unknown".to_string();
    };

    let mut names = Vec::new();
    collect_dependency_names(&doc, &mut names);
    if let Some(ws) = doc.get("workspace").and_then(|w| w.get("dependencies")) {
        push_table_names(ws, &mut names);
    }

    let root = manifest.parent().unwrap_or_else(|| Path::new("."));
    for member in workspace_members(&doc, root) {
        if let Some(member_doc) = read_manifest(&member.join("Cargo.toml")) {
            collect_dependency_names(&member_doc, &mut names);
        }
    }

    if names.is_empty() {
        "Unknown".to_string()
    } else {
        names.join(", ")
    }
}

fn read_manifest(path: &Path) -> Option<toml_edit::DocumentMut> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "manifest unreadable");
            return None;
        }
    };
    match raw.parse() {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "manifest is not valid TOML");
            None
        }
    }
}

fn collect_dependency_names(doc: &toml_edit::DocumentMut, names: &mut Vec<String>) {
    for table in DEPENDENCY_TABLES.iter().filter_map(|name| doc.get(name)) {
        push_table_names(table, names);
    }
}

fn push_table_names(table: &toml_edit::Item, names: &mut Vec<String>) {
    let Some(table) = table.as_table_like() else {
        return;
    };
    for (name, entry) in table.iter() {
        let local = entry
            .as_table_like()
            .is_some_and(|t| t.contains_key("path"));
        if !local && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
}

/// Member directories of a `[workspace]`, with trailing `/*` globs expanded.
fn workspace_members(doc: &toml_edit::DocumentMut, root: &Path) -> Vec<PathBuf> {
    let Some(members) = doc
        .get("workspace")
        .and_then(|w| w.get("members"))
        .and_then(|m| m.as_array())
    else {
        return Vec::new();
    };

    let mut dirs = Vec::new();
    for pattern in members.iter().filter_map(|m| m.as_str()) {
        match pattern.strip_suffix("/*") {
            Some(parent) => {
                let Ok(entries) = std::fs::read_dir(root.join(parent)) else {
                    continue;
                };
                let mut found: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect();
                found.sort();
                dirs.extend(found);
            }
            None => dirs.push(root.join(pattern)),
        }
    }
    dirs
}

/// Plain-text digest of the root diagram for the model.
pub fn architecture_summary(graph: Option<&Graph>) -> String {
    let Some(graph) = graph else {
        return "No architecture defined.".to_string();
    };

    let groups: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.is_group())
        .map(|n| {
            if n.data.label.is_empty() {
                "Unnamed Group"
            } else {
                n.data.label.as_str()
            }
        })
        .collect();

    let components: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| !n.is_group())
        .map(|n| {
            let kind = n
                .data
                .service_type
                .map(|t| t.as_str())
                .unwrap_or(n.kind.as_str());
            let mut desc = format!("{} ({})", n.data.label, kind);
            if let Some(sub) = n.data.sub_label.as_deref().filter(|s| !s.is_empty()) {
                desc.push_str(" - ");
                desc.push_str(sub);
            }
            if !n.data.details.is_empty() {
                desc.push_str(&format!(" [{}]", n.data.details.join(", ")));
            }
            desc
        })
        .collect();

    format!(
        "- Groups/Zones: {}\n- Components: {}",
        groups.join(", "),
        components.join(", ")
    )
}

pub fn system_prompt(tech_stack: &str, architecture: &str, rule: &Rule) -> String {
    format!(
        r#"You are a helpful AI assistant specialized in analyzing banking rules and use cases for the BFIU (Bangladesh Financial Intelligence Unit) Rules Analytics App.

TECHNICAL CONTEXT (The actual stack used in this project):
- Backend: Rust (axum, tokio)
- Storage: flat JSON documents
- Diagrams: node/edge graphs with drill-down views
- AI/LLM: Ollama (running locally)
- Libraries: {tech_stack}

CURRENT SYSTEM ARCHITECTURE (Dynamically loaded):
{architecture}

USE CASE CONTEXT:
ID: {id}
Title: {title}
Description: {description}
Indicators: {indicators}
Section: {section}
Type: {rule_type}
Risk: {risk}

YOUR ROLE:
1. Help the user understand this use case and suggest technical solutions that align with the CURRENT stack and architecture.
2. If suggesting a new feature, explain how it fits into the existing architecture.
3. Reference specific components or libraries from the context above when appropriate.
4. Keep answers concise, professional, and technically accurate."#,
        id = rule.id,
        title = rule.title,
        description = rule.description,
        indicators = rule.indicators.join(", "),
        section = rule.section,
        rule_type = rule.rule_type,
        risk = rule.risk,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleboard_core::{defaults, Node, NodeData, NodeKind, Position, RuleType, Section};
    use tempfile::TempDir;

    fn node(id: &str, kind: NodeKind, data: NodeData) -> Node {
        Node {
            id: id.to_string(),
            kind,
            position: Position::default(),
            size: None,
            style: None,
            parent_node: None,
            extent: None,
            data,
        }
    }

    #[test]
    fn tech_stack_lists_every_dependency_table_once() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        std::fs::write(
            &manifest,
            r#"
[workspace.dependencies]
serde = "1"

[dependencies]
axum = "0.7"
tokio = { version = "1", features = ["full"] }

[dev-dependencies]
tempfile = "3"
tokio = "1"
"#,
        )
        .unwrap();
        assert_eq!(tech_stack(&manifest), "axum, tokio, tempfile, serde");
    }

    #[test]
    fn tech_stack_is_unknown_without_a_manifest() {
        let dir = TempDir::new().unwrap();
        assert_eq!(tech_stack(&dir.path().join("missing.toml")), "Unknown");
        let broken = dir.path().join("Cargo.toml");
        std::fs::write(&broken, "[dependencies\n").unwrap();
        assert_eq!(tech_stack(&broken), "Unknown");
        std::fs::write(&broken, "[package]\nname = \"bare\"\n").unwrap();
        assert_eq!(tech_stack(&broken), "Unknown");
    }

    #[test]
    fn tech_stack_of_workspace_root_reads_its_members() {
        let dir = TempDir::new().unwrap();
        let write = |rel: &str, body: &str| {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        };
        write(
            "Cargo.toml",
            "[workspace]\nmembers = [\"crates/*\", \"tools/cli\"]\nresolver = \"2\"\n",
        );
        write(
            "crates/core/Cargo.toml",
            "[package]\nname = \"core\"\n\n[dependencies]\nserde = \"1\"\nchrono = \"0.4\"\n",
        );
        write(
            "crates/server/Cargo.toml",
            "[package]\nname = \"server\"\n\n[dependencies]\ncore = { path = \"../core\" }\n\
             axum = \"0.7\"\nserde = \"1\"\n\n[dev-dependencies]\nreqwest = \"0.12\"\n",
        );
        write(
            "tools/cli/Cargo.toml",
            "[package]\nname = \"cli\"\n\n[dependencies]\nclap = \"4\"\n",
        );

        assert_eq!(
            tech_stack(&dir.path().join("Cargo.toml")),
            "serde, chrono, axum, reqwest, clap"
        );
    }

    #[test]
    fn summary_without_graph() {
        assert_eq!(architecture_summary(None), "No architecture defined.");
    }

    #[test]
    fn summary_lists_groups_and_components() {
        let graph = Graph {
            nodes: vec![
                node("g1", NodeKind::Group, NodeData { label: "Zone A".into(), ..NodeData::default() }),
                node("g2", NodeKind::Group, NodeData::default()),
                node(
                    "db",
                    NodeKind::Leaf,
                    NodeData {
                        label: "Ledger".into(),
                        sub_label: Some("Postgres".into()),
                        details: vec!["WAL".into(), "replicas".into()],
                        service_type: Some(ruleboard_core::ServiceType::Database),
                        ..NodeData::default()
                    },
                ),
                node("x", NodeKind::Leaf, NodeData { label: "Bare".into(), ..NodeData::default() }),
            ],
            edges: vec![],
        };
        let summary = architecture_summary(Some(&graph));
        assert!(summary.contains("Groups/Zones: Zone A, Unnamed Group"));
        assert!(summary.contains("Ledger (database) - Postgres [WAL, replicas]"));
        assert!(summary.contains("Bare (leaf)"));
    }

    #[test]
    fn prompt_carries_rule_and_context() {
        let rule = Rule {
            id: "CR-007".into(),
            title: "Rapid repayment".into(),
            description: "Loan closed early".into(),
            indicators: vec!["third party".into(), "cash".into()],
            section: Section::Credit,
            rule_type: RuleType::AiRag,
            risk: "High".into(),
        };
        let summary = architecture_summary(Some(&defaults::architecture()));
        let prompt = system_prompt("axum, tokio", &summary, &rule);
        assert!(prompt.contains("ID: CR-007"));
        assert!(prompt.contains("Indicators: third party, cash"));
        assert!(prompt.contains("Type: AI-RAG"));
        assert!(prompt.contains("Section: Credit"));
        assert!(prompt.contains("Libraries: axum, tokio"));
        assert!(prompt.contains("Apache Kafka"));
    }
}
