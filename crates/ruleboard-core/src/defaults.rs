//! Built-in documents: the factory architecture diagram and the seed collections used
//! when nothing has been persisted yet.

use serde_json::json;

use crate::{
    Edge, EdgeKind, Graph, Node, NodeData, NodeKind, PhaseStatus, Position, Rule, RuleType,
    Section, ServiceType, TimelinePhase,
};

fn service(
    id: &str,
    (x, y): (f64, f64),
    label: &str,
    sub_label: Option<&str>,
    icon: &str,
    service_type: ServiceType,
    details: &[&str],
) -> Node {
    Node {
        id: id.to_string(),
        kind: NodeKind::Leaf,
        position: Position { x, y },
        size: None,
        style: None,
        parent_node: None,
        extent: None,
        data: NodeData {
            label: label.to_string(),
            sub_label: sub_label.map(str::to_string),
            icon: Some(icon.to_string()),
            details: details.iter().map(|d| d.to_string()).collect(),
            service_type: Some(service_type),
            ..NodeData::default()
        },
    }
}

fn member(parent: &str, mut node: Node) -> Node {
    node.parent_node = Some(parent.to_string());
    node.extent = Some("parent".to_string());
    node
}

fn group(id: &str, (x, y): (f64, f64), (width, height): (f64, f64), label: &str, style: serde_json::Value) -> Node {
    let mut node = Node {
        id: id.to_string(),
        kind: NodeKind::Group,
        position: Position { x, y },
        size: Some(crate::Size { width, height }),
        style: Some(style),
        parent_node: None,
        extent: None,
        data: NodeData {
            label: label.to_string(),
            ..NodeData::default()
        },
    };
    node.mirror_size_into_style();
    node
}

fn link(id: &str, source: &str, target: &str, animated: bool) -> Edge {
    Edge {
        animated,
        ..Edge::new(id, source, target)
    }
}

fn dashed(mut edge: Edge) -> Edge {
    edge.style = Some(json!({ "strokeDasharray": "5,5" }));
    edge
}

/// Factory default for the root view.
pub fn architecture() -> Graph {
    let dashed_border = json!({ "border": "1px dashed #cbd5e1", "borderRadius": "8px" });
    let nodes = vec![
        service(
            "cbs",
            (250.0, 0.0),
            "Core Banking Systems",
            Some("CBS / Trade Systems (Oracle / Postgres)"),
            "Database",
            ServiceType::Database,
            &[
                "Source of Truth for financial data",
                "Handles high-volume transactions",
                "Legacy systems integration",
            ],
        ),
        service(
            "ums",
            (800.0, 0.0),
            "UMS / Security",
            Some("Keycloak (RBAC / SSO)"),
            "Shield",
            ServiceType::Security,
            &[
                "Centralized Identity Management",
                "Role-Based Access Control",
                "Single Sign-On (SSO)",
            ],
        ),
        service(
            "cdc",
            (250.0, 150.0),
            "Change Data Capture",
            Some("Debezium CDC + NiFi"),
            "RefreshCw",
            ServiceType::Integration,
            &[
                "Real-time database log mining",
                "Zero-impact on source DB",
                "Apache NiFi for transformation",
            ],
        ),
        service(
            "app-platform",
            (800.0, 150.0),
            "Application Platform",
            Some("Spring Boot Gateway (API / BFF)"),
            "Server",
            ServiceType::Service,
            &[
                "API Gateway Pattern",
                "Backend for Frontend (BFF)",
                "Request Routing & Rate Limiting",
            ],
        ),
        service(
            "kafka",
            (250.0, 300.0),
            "Event Backbone",
            Some("Apache Kafka"),
            "Activity",
            ServiceType::Integration,
            &[
                "High-throughput event streaming",
                "Decoupled architecture",
                "Message persistence",
            ],
        ),
        group(
            "ui",
            (600.0, 300.0),
            (500.0, 120.0),
            "User Interfaces",
            json!({ "border": "1px dashed #cbd5e1", "borderRadius": "8px", "padding": "10px" }),
        ),
        member(
            "ui",
            service("ui-superset", (20.0, 40.0), "Superset / Grafana", None, "BarChart", ServiceType::Interface, &[]),
        ),
        member(
            "ui",
            service("ui-bpm", (180.0, 40.0), "Business Process Mgmt", None, "ClipboardList", ServiceType::Interface, &[]),
        ),
        member(
            "ui",
            service("ui-ai", (340.0, 40.0), "AI Assistant/Agent", None, "Bot", ServiceType::Interface, &[]),
        ),
        service(
            "doris",
            (500.0, 500.0),
            "Analytical Datamart",
            Some("Apache Doris (HSAP Tables)"),
            "Database",
            ServiceType::Database,
            &[
                "Real-time Analytics",
                "High-speed Ad-hoc Queries",
                "Unified Data Storage",
            ],
        ),
        group("search", (0.0, 600.0), (200.0, 200.0), "Optional Search & Logs", dashed_border.clone()),
        member(
            "search",
            service("elasticsearch", (20.0, 40.0), "Elasticsearch Cluster", None, "Search", ServiceType::Database, &[]),
        ),
        member(
            "search",
            service("kibana", (20.0, 120.0), "Kibana Access", None, "Monitor", ServiceType::Interface, &[]),
        ),
        group(
            "eaip",
            (250.0, 650.0),
            (450.0, 250.0),
            "Era AI Intelligence Platform (EAIP)",
            json!({
                "border": "2px solid #6366f1",
                "borderRadius": "12px",
                "backgroundColor": "rgba(99, 102, 241, 0.05)"
            }),
        ),
        member(
            "eaip",
            service("eaip-orch", (20.0, 50.0), "Agent Orchestrator", Some("Multi-Hop Logic"), "Cpu", ServiceType::Service, &[]),
        ),
        member(
            "eaip",
            service("eaip-langgraph", (240.0, 50.0), "LangGraph Agents", Some("+ Tool Gateway"), "Network", ServiceType::Service, &[]),
        ),
        member(
            "eaip",
            service("eaip-rag", (20.0, 150.0), "RAG Engine", Some("Evidence & Narrative"), "BookOpen", ServiceType::Service, &[]),
        ),
        member(
            "eaip",
            service("eaip-ml", (240.0, 150.0), "ML Models", Some("XGBoost / PyTorch"), "Brain", ServiceType::Service, &[]),
        ),
        group("rms", (750.0, 650.0), (400.0, 150.0), "RMS - Real-Time Monitoring", dashed_border),
        member(
            "rms",
            service("rms-kogito", (20.0, 50.0), "Kogito Rules Engine", None, "Settings", ServiceType::Service, &[]),
        ),
        member(
            "rms",
            service("rms-ml", (200.0, 50.0), "Real-Time ML Scoring", None, "Zap", ServiceType::Service, &[]),
        ),
        service("case-mgmt", (750.0, 850.0), "Case Management", Some("Flowable BPM"), "Briefcase", ServiceType::Service, &[]),
        service(
            "reg-reporting",
            (750.0, 980.0),
            "Regulatory Reporting",
            Some("STR Export Service"),
            "FileText",
            ServiceType::Service,
            &[],
        ),
        service(
            "central-engine",
            (1200.0, 650.0),
            "Central Analytical Engine",
            Some("Hybrid Search (HSAP)"),
            "Globe",
            ServiceType::Service,
            &[
                "Real-time + Historical analytics",
                "Handles 95% of workloads",
                "Kibana log exploration",
            ],
        ),
    ];

    let mut search_edge = dashed(link("e4", "kafka", "search", false));
    search_edge.kind = EdgeKind::Smoothstep;

    let edges = vec![
        link("e1", "cbs", "cdc", true),
        link("e2", "cdc", "kafka", true),
        link("e3", "kafka", "doris", true),
        search_edge,
        link("e5", "ums", "app-platform", false),
        link("e6", "app-platform", "ui", false),
        link("e7", "ui", "doris", true),
        link("e8", "doris", "eaip", true),
        link("e9", "doris", "rms", true),
        link("e10", "rms", "case-mgmt", false),
        link("e11", "case-mgmt", "reg-reporting", false),
        link("e12", "eaip", "case-mgmt", false),
        dashed(link("e13", "doris", "central-engine", false)),
    ];

    Graph { nodes, edges }
}

fn rule(
    id: &str,
    section: Section,
    rule_type: RuleType,
    risk: &str,
    description: &str,
    indicators: &[&str],
) -> Rule {
    let title = if description.chars().count() > 60 {
        let cut: String = description.chars().take(60).collect();
        format!("{cut}...")
    } else {
        description.to_string()
    };
    Rule {
        id: id.to_string(),
        title,
        description: description.to_string(),
        indicators: indicators.iter().map(|i| i.to_string()).collect(),
        section,
        rule_type,
        risk: risk.to_string(),
    }
}

/// Seed rules catalog.
pub fn rules() -> Vec<Rule> {
    use RuleType::*;
    use Section::*;
    vec![
        rule(
            "GE-001",
            GeneralBanking,
            HardLogic,
            "High",
            "Cash deposits just below the reporting threshold made repeatedly within seven days",
            &["Multiple deposits between 90% and 100% of the CTR threshold"],
        ),
        rule(
            "GE-002",
            GeneralBanking,
            HardLogic,
            "Med",
            "Dormant account reactivated and followed by large outward transfers",
            &["Account inactive for 12 months", "Outflow above 5x historical average"],
        ),
        rule(
            "GE-003",
            GeneralBanking,
            AiAgents,
            "High",
            "Customer profile inconsistent with observed transaction behaviour",
            &["Declared income does not support turnover", "Occupation and counterparties mismatch"],
        ),
        rule(
            "GE-004",
            GeneralBanking,
            AiRag,
            "Med",
            "Adverse media mentions of customer or related parties",
            &["News screening hit", "Related party on watch list"],
        ),
        rule(
            "CR-001",
            Credit,
            HardLogic,
            "High",
            "Loan repaid in full shortly after disbursement from an unrelated third party",
            &["Early settlement within 90 days", "Repayment source is not the borrower"],
        ),
        rule(
            "CR-002",
            Credit,
            AiAgents,
            "Med",
            "Loan proceeds diverted to accounts unrelated to the stated purpose",
            &["Disbursement forwarded within 48 hours"],
        ),
        rule(
            "CR-003",
            Credit,
            AiRag,
            "Low-Med",
            "Collateral valuation inconsistent with market references",
            &["Valuation above regional benchmark"],
        ),
        rule(
            "TR-001",
            Trade,
            HardLogic,
            "High",
            "Over or under invoicing of goods compared with declared unit prices",
            &["Unit price deviates more than 25% from reference"],
        ),
        rule(
            "TR-002",
            Trade,
            AiRag,
            "High",
            "Shipment routed through high-risk jurisdictions without commercial rationale",
            &["Transshipment via sanctioned port", "Vessel identity gaps"],
        ),
        rule(
            "TR-003",
            Trade,
            AiAgents,
            "Med",
            "Repeated amendments to letters of credit changing beneficiary details",
            &["Three or more beneficiary amendments"],
        ),
        rule(
            "RE-001",
            Remittance,
            HardLogic,
            "High",
            "Many inward remittances from unrelated senders to a single beneficiary",
            &["More than 10 distinct senders in 30 days"],
        ),
        rule(
            "RE-002",
            Remittance,
            AiAgents,
            "Med",
            "Remittance withdrawn in cash immediately after credit",
            &["Cash withdrawal within 24 hours of inward credit"],
        ),
    ]
}

fn phase(
    id: &str,
    title: &str,
    duration: &str,
    dates: &str,
    focus: &str,
    deliverables: &[&str],
    testing: &str,
    status: PhaseStatus,
) -> TimelinePhase {
    TimelinePhase {
        id: id.to_string(),
        title: title.to_string(),
        duration: duration.to_string(),
        dates: dates.to_string(),
        focus: focus.to_string(),
        deliverables: deliverables.iter().map(|d| d.to_string()).collect(),
        testing: testing.to_string(),
        notes: String::new(),
        status,
        milestone: None,
        holiday: None,
    }
}

/// Seed roadmap, in chronological order.
pub fn timeline() -> Vec<TimelinePhase> {
    use PhaseStatus::*;
    let mut phases = vec![
        phase(
            "phase-1",
            "Foundation & Data Ingestion",
            "4 weeks",
            "Jan 2026",
            "CDC pipelines from core banking into the event backbone",
            &["Debezium connectors", "Kafka topics", "Landing tables in the datamart"],
            "Replay of one month of production transactions",
            InProgress,
        ),
        phase(
            "phase-2",
            "Hard Logic Rules MVP",
            "4 weeks",
            "Feb 2026",
            "General Banking hard logic rules on the rules engine",
            &["Threshold rules", "Alert queue", "Case creation"],
            "Back-testing against historical STRs",
            Planned,
        ),
        phase(
            "phase-3",
            "Case Management",
            "4 weeks",
            "Mar 2026",
            "Investigation workflow and regulatory export",
            &["BPM workflow", "STR export"],
            "User acceptance with the compliance team",
            Planned,
        ),
        phase(
            "phase-4",
            "AI Agents",
            "4 weeks",
            "Apr 2026",
            "Agent-driven rules for Credit and Trade",
            &["Agent orchestrator", "Tool gateway"],
            "Analyst review of agent findings",
            Planned,
        ),
        phase(
            "phase-5",
            "RAG Evidence Engine",
            "4 weeks",
            "May 2026",
            "Narrative generation and evidence retrieval",
            &["Document index", "Narrative templates"],
            "Accuracy review on sampled cases",
            Planned,
        ),
        phase(
            "phase-6",
            "Real-Time Monitoring",
            "4 weeks",
            "Jun 2026",
            "Streaming scoring for Remittance",
            &["Real-time ML scoring", "Latency dashboards"],
            "Load test at peak remittance volume",
            Planned,
        ),
        phase(
            "phase-7",
            "Full Coverage & Handover",
            "4 weeks",
            "Jul 2026",
            "Remaining rules, hardening and handover",
            &["All sections covered", "Runbooks", "Training"],
            "End-to-end regression",
            Planned,
        ),
    ];
    phases[1].milestone = Some("First alerts in production".to_string());
    phases[2].holiday = Some("Eid holidays".to_string());
    phases[6].milestone = Some("Full coverage".to_string());
    phases
}
