//! Diagram assembly engine
//!
//! Pure functions from a [`FilterConfig`] to Mermaid text. Fragments are
//! emitted in canonical tag order, then cross-link lines in a fixed
//! handwritten dependency order; a link appears only when every tag it
//! references is enabled. No validation of the resulting Mermaid happens
//! here; a partial or orphaned view is legal output, and syntax problems
//! surface at render time in the browser.

use crate::filters::FilterConfig;
use crate::templates::{
    self, Tag, AGENT_PLACEHOLDER, AGENT_STATE_DIAGRAM, ARCHITECTURE_HEADER, COMPLETE_DIAGRAM,
    DS_GOVERNANCE_OVERLAY, DS_PIPELINE, DS_PLACEHOLDER,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four built-in views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Architecture,
    Agent,
    Ds,
    Complete,
}

impl DiagramKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Architecture => "architecture",
            DiagramKind::Agent => "agent",
            DiagramKind::Ds => "ds",
            DiagramKind::Complete => "complete",
        }
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a diagram kind outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl std::fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown diagram type '{}' (expected: architecture, agent, ds, complete)",
            self.0
        )
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for DiagramKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architecture" => Ok(DiagramKind::Architecture),
            "agent" => Ok(DiagramKind::Agent),
            "ds" => Ok(DiagramKind::Ds),
            "complete" => Ok(DiagramKind::Complete),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

// Cross-link rules in handwritten dependency order. A rule's lines are
// emitted only when every tag it references is enabled. The per-link gating
// inside the obs/governance groups is curated, not derived; keep it literal.

/// Two-endpoint rules, evaluated first.
const PAIR_RULES: &[(Tag, Tag, &str)] = &[
    (Tag::Api, Tag::Orchestrator, "API1 --> ROUTER\n"),
    (Tag::Orchestrator, Tag::Agents, "ROUTER --> PLAN\nVALID --> ROUTER\n"),
    (Tag::Agents, Tag::Retrieval, "SPEC --> EMB\nAUG --> SPEC\n"),
    (Tag::Retrieval, Tag::Data, "VEC <--> VDB\nCHUNK --> POL\n"),
    (
        Tag::Tools,
        Tag::Agents,
        "SPEC --> DBT\nSPEC --> FILE\nSPEC --> WEB\nVALID --> ACT\n",
    ),
    (
        Tag::Tools,
        Tag::Data,
        "DBT <--> DWH\nFILE <--> POL\nWEB --> POL\nACT --> DWH\n",
    ),
];

/// Observability links: the group is gated by `obs`, each link additionally
/// by its specific source tag.
const OBS_LINKS: &[(Tag, &str)] = &[
    (Tag::Api, "API1 --> MET"),
    (Tag::Orchestrator, "ROUTER --> TRC"),
    (Tag::Agents, "VALID --> TRC"),
    (Tag::Tools, "ACT --> TRC"),
    (Tag::Data, "TRC --> LOGS"),
];

/// Governance links: the group is gated by `governance`, each link
/// additionally by its specific endpoint tag.
const GOV_LINKS: &[(Tag, &str)] = &[
    (Tag::Api, "API1 --> AUTH"),
    (Tag::Agents, "SPEC --> PII"),
    (Tag::Agents, "SPEC --> INJ"),
    (Tag::Agents, "VALID --> PROV"),
];

/// Final pair rule, after the gated groups.
const DS_AGENTS_RULE: &str = "PLAN --> DSREQ\nDSPIP --> SPEC\nDSPKG --> ACT\n";

/// Assemble the filtered architecture view.
///
/// With zero tags enabled the output is exactly the header: no fragments,
/// no cross-link banner, no links.
pub fn assemble_architecture(config: &FilterConfig) -> String {
    let mut diagram = String::from(ARCHITECTURE_HEADER);

    for tag in Tag::ALL {
        if config.is_enabled(tag) {
            diagram.push_str(templates::fragment(tag));
        }
    }

    let links = cross_links(config);
    if !links.is_empty() {
        diagram.push_str("\n%% Cross-links (only show if both ends enabled)\n");
        diagram.push_str(&links);
    }

    diagram
}

fn cross_links(config: &FilterConfig) -> String {
    let has = |tag| config.is_enabled(tag);
    let mut links = String::new();

    for (a, b, lines) in PAIR_RULES {
        if has(*a) && has(*b) {
            links.push_str(lines);
        }
    }

    if has(Tag::Obs) {
        push_group(&mut links, OBS_LINKS, &has);
    }

    if has(Tag::Governance) {
        push_group(&mut links, GOV_LINKS, &has);
    }

    if has(Tag::Ds) && has(Tag::Agents) {
        links.push_str(DS_AGENTS_RULE);
    }

    links
}

// A group whose header tag is enabled but with no qualifying inner links
// contributes nothing, not an empty marker.
fn push_group(links: &mut String, group: &[(Tag, &str)], has: &impl Fn(Tag) -> bool) {
    let qualifying: Vec<&str> = group
        .iter()
        .filter(|(tag, _)| has(*tag))
        .map(|(_, line)| *line)
        .collect();

    if !qualifying.is_empty() {
        links.push_str(&qualifying.join("\n"));
        links.push('\n');
    }
}

/// The agent reasoning view: the fixed state diagram when `agents` is on,
/// otherwise the fixed placeholder. No other flag matters.
pub fn assemble_agent_flow(config: &FilterConfig) -> String {
    if config.is_enabled(Tag::Agents) {
        AGENT_STATE_DIAGRAM.to_string()
    } else {
        AGENT_PLACEHOLDER.to_string()
    }
}

/// The DS pipeline view. `ds` gates the whole view; with `governance` also
/// enabled the overlay is appended. With `ds` off the placeholder is
/// returned regardless of any other flag.
pub fn assemble_ds_view(config: &FilterConfig) -> String {
    if !config.is_enabled(Tag::Ds) {
        return DS_PLACEHOLDER.to_string();
    }

    let mut diagram = DS_PIPELINE.to_string();
    if config.is_enabled(Tag::Governance) {
        diagram.push('\n');
        diagram.push_str(DS_GOVERNANCE_OVERLAY);
    }
    diagram
}

/// Dispatch on the built-in view kinds. `complete` ignores the filters and
/// returns the curated maximal diagram verbatim.
pub fn assemble(kind: DiagramKind, config: &FilterConfig) -> String {
    match kind {
        DiagramKind::Architecture => assemble_architecture(config),
        DiagramKind::Agent => assemble_agent_flow(config),
        DiagramKind::Ds => assemble_ds_view(config),
        DiagramKind::Complete => COMPLETE_DIAGRAM.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::preset;
    use proptest::prelude::*;

    fn only(tags: &[Tag]) -> FilterConfig {
        let mut config = preset("all_off").unwrap();
        for tag in tags {
            config.set(*tag, true);
        }
        config
    }

    #[test]
    fn test_zero_tags_yields_header_only() {
        let output = assemble_architecture(&preset("all_off").unwrap());
        assert_eq!(output, ARCHITECTURE_HEADER);
    }

    #[test]
    fn test_fragments_follow_canonical_order() {
        let output = assemble_architecture(&preset("all_on").unwrap());

        let markers = [
            "subgraph API[", "subgraph ORCH[", "subgraph AG[", "subgraph RAG[",
            "subgraph TOOLS[", "subgraph DATA[", "subgraph GOV[", "subgraph OBS[",
            "subgraph DSX[",
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|m| output.find(m).unwrap_or_else(|| panic!("missing {m}")))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "fragments out of order: {positions:?}"
        );
    }

    #[test]
    fn test_link_requires_both_endpoints() {
        // orchestrator alone: no router->planner link without agents
        let output = assemble_architecture(&only(&[Tag::Orchestrator]));
        assert!(output.contains("subgraph ORCH["));
        assert!(!output.contains("ROUTER --> PLAN"));

        let output = assemble_architecture(&only(&[Tag::Orchestrator, Tag::Agents]));
        assert!(output.contains("ROUTER --> PLAN"));
        assert!(output.contains("VALID --> ROUTER"));
    }

    #[test]
    fn test_obs_group_gated_per_link() {
        // obs + api: only the API metrics link, none of the others
        let output = assemble_architecture(&only(&[Tag::Obs, Tag::Api]));
        assert!(output.contains("API1 --> MET"));
        assert!(!output.contains("ROUTER --> TRC"));
        assert!(!output.contains("TRC --> LOGS"));
    }

    #[test]
    fn test_obs_group_empty_adds_nothing() {
        // obs alone: fragment appears but no link lines and no banner
        let output = assemble_architecture(&only(&[Tag::Obs]));
        assert!(output.contains("subgraph OBS["));
        assert!(!output.contains("%% Cross-links"));
    }

    #[test]
    fn test_governance_group_gated_per_link() {
        let output = assemble_architecture(&only(&[Tag::Governance, Tag::Agents]));
        assert!(output.contains("SPEC --> PII"));
        assert!(output.contains("SPEC --> INJ"));
        assert!(output.contains("VALID --> PROV"));
        assert!(!output.contains("API1 --> AUTH"));
    }

    #[test]
    fn test_end_to_end_api_orchestrator_agents() {
        let config = only(&[Tag::Api, Tag::Orchestrator, Tag::Agents]);
        let output = assemble_architecture(&config);

        assert!(output.contains("subgraph API["));
        assert!(output.contains("subgraph ORCH["));
        assert!(output.contains("subgraph AG["));
        assert!(output.contains("API1 --> ROUTER"));
        assert!(output.contains("ROUTER --> PLAN"));

        for absent in [
            "subgraph RAG[", "subgraph TOOLS[", "subgraph DATA[", "subgraph GOV[",
            "subgraph OBS[", "subgraph DSX[", "SPEC --> EMB", "SPEC --> DBT",
            "API1 --> MET", "API1 --> AUTH", "PLAN --> DSREQ",
        ] {
            assert!(!output.contains(absent), "unexpected content: {absent}");
        }
    }

    #[test]
    fn test_agent_flow_binary_switch() {
        let on = preset("all_on").unwrap();
        assert_eq!(assemble_agent_flow(&on), AGENT_STATE_DIAGRAM);

        // agents off: placeholder verbatim, independent of every other flag
        let off = preset("all_on").unwrap().with(Tag::Agents, false);
        assert_eq!(assemble_agent_flow(&off), AGENT_PLACEHOLDER);

        let all_off = preset("all_off").unwrap().with(Tag::Agents, true);
        assert_eq!(assemble_agent_flow(&all_off), AGENT_STATE_DIAGRAM);
    }

    #[test]
    fn test_ds_view_concatenation() {
        let both = only(&[Tag::Ds, Tag::Governance]);
        let expected = format!("{}\n{}", DS_PIPELINE, DS_GOVERNANCE_OVERLAY);
        assert_eq!(assemble_ds_view(&both), expected);

        let ds_only = only(&[Tag::Ds]);
        assert_eq!(assemble_ds_view(&ds_only), DS_PIPELINE);

        // ds off: placeholder regardless of governance
        let gov_only = only(&[Tag::Governance]);
        assert_eq!(assemble_ds_view(&gov_only), DS_PLACEHOLDER);
        assert_eq!(assemble_ds_view(&only(&[])), DS_PLACEHOLDER);
    }

    #[test]
    fn test_complete_ignores_filters() {
        let output = assemble(DiagramKind::Complete, &preset("all_off").unwrap());
        assert_eq!(output, COMPLETE_DIAGRAM);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("architecture".parse::<DiagramKind>().unwrap(), DiagramKind::Architecture);
        assert_eq!("complete".parse::<DiagramKind>().unwrap(), DiagramKind::Complete);
        let err = "gantt".parse::<DiagramKind>().unwrap_err();
        assert_eq!(err.0, "gantt");
    }

    fn arb_config() -> impl Strategy<Value = FilterConfig> {
        proptest::collection::vec(any::<bool>(), 9).prop_map(|flags| {
            let mut config = FilterConfig::new();
            for (tag, on) in Tag::ALL.into_iter().zip(flags) {
                config.set(tag, on);
            }
            config
        })
    }

    proptest! {
        #[test]
        fn prop_fragment_order_is_canonical(config in arb_config()) {
            let output = assemble_architecture(&config);
            let mut last = 0usize;
            for tag in Tag::ALL {
                if config.is_enabled(tag) {
                    let frag = crate::templates::fragment(tag);
                    let pos = output[last..]
                        .find(frag.trim_end())
                        .expect("enabled fragment missing or out of order");
                    last += pos;
                }
            }
        }

        #[test]
        fn prop_pair_link_iff_both_enabled(config in arb_config()) {
            let output = assemble_architecture(&config);
            let expected = config.is_enabled(Tag::Api) && config.is_enabled(Tag::Orchestrator);
            prop_assert_eq!(output.contains("API1 --> ROUTER"), expected);

            let ds_expected = config.is_enabled(Tag::Ds) && config.is_enabled(Tag::Agents);
            prop_assert_eq!(output.contains("PLAN --> DSREQ"), ds_expected);
        }

        #[test]
        fn prop_obs_links_need_obs_and_source(config in arb_config()) {
            let output = assemble_architecture(&config);
            let expected = config.is_enabled(Tag::Obs) && config.is_enabled(Tag::Data);
            prop_assert_eq!(output.contains("TRC --> LOGS"), expected);
        }
    }
}
