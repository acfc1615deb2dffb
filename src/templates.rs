//! Static Mermaid template data
//!
//! Per-tag architecture fragments, the fixed complete diagrams, and the
//! auxiliary template catalog. Everything here is compiled-in data; nothing
//! is mutated at runtime.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A section of the architecture that can be toggled on or off.
///
/// The set is closed: assembly, filters, and the HTTP facade all agree on
/// exactly these nine tags. `Tag::ALL` is the canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Api,
    Orchestrator,
    Agents,
    Retrieval,
    Tools,
    Data,
    Governance,
    Obs,
    Ds,
}

impl Tag {
    /// Canonical order for fragment emission.
    pub const ALL: [Tag; 9] = [
        Tag::Api,
        Tag::Orchestrator,
        Tag::Agents,
        Tag::Retrieval,
        Tag::Tools,
        Tag::Data,
        Tag::Governance,
        Tag::Obs,
        Tag::Ds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Api => "api",
            Tag::Orchestrator => "orchestrator",
            Tag::Agents => "agents",
            Tag::Retrieval => "retrieval",
            Tag::Tools => "tools",
            Tag::Data => "data",
            Tag::Governance => "governance",
            Tag::Obs => "obs",
            Tag::Ds => "ds",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a tag name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl std::fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown tag '{}' (expected one of: api, orchestrator, agents, retrieval, tools, data, governance, obs, ds)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for Tag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(Tag::Api),
            "orchestrator" => Ok(Tag::Orchestrator),
            "agents" => Ok(Tag::Agents),
            "retrieval" => Ok(Tag::Retrieval),
            "tools" => Ok(Tag::Tools),
            "data" => Ok(Tag::Data),
            "governance" => Ok(Tag::Governance),
            "obs" => Ok(Tag::Obs),
            "ds" => Ok(Tag::Ds),
            other => Err(UnknownTag(other.to_string())),
        }
    }
}

/// The architecture fragment for one tag.
///
/// Fragments carry their own subgraph/node/edge syntax and are emitted
/// verbatim; cross-links between fragments live in the assembly engine.
pub fn fragment(tag: Tag) -> &'static str {
    match tag {
        Tag::Api => {
            r#"
subgraph API["API / UI Layer (Request Surface)"]
  UI[Web UI / Chat UI]
  API1[FastAPI / Gateway]
  UI --> API1
end
"#
        }
        Tag::Orchestrator => {
            r#"
subgraph ORCH["Orchestrator (Control Plane)"]
  ROUTER[Router / Policy]
  STATE[State Store]
  ROUTER <--> STATE
end
"#
        }
        Tag::Agents => {
            r#"
subgraph AG["Agents (Intent + Reasoning)"]
  PLAN[Planner Agent]
  SPEC["Specialized Agents<br/>(Policy, DS, Ops, Risk)"]
  VALID[Validator / Critic]
  PLAN --> SPEC
  SPEC --> VALID
end
"#
        }
        Tag::Retrieval => {
            r#"
subgraph RAG["Retrieval (RAG Data Plane)"]
  EMB[Embed Query]
  VEC[Vector Search]
  CHUNK[Top-K Chunks]
  AUG[Prompt Augmentation]
  EMB --> VEC --> CHUNK --> AUG
end
"#
        }
        Tag::Tools => {
            r#"
subgraph TOOLS["Tools / Actions (Execution)"]
  DBT["DB Tool<br/>(SQL/NoSQL/Warehouse)"]
  FILE["Doc Tool<br/>(PDF/DOC/HTML)"]
  WEB[Web Search Tool]
  ACT["Action Tool<br/>(API calls / tickets / emails)"]
end
"#
        }
        Tag::Data => {
            r#"
subgraph DATA["Data Stores"]
  VDB[(Vector DB)]
  POL[(Policy Docs)]
  DWH[(Warehouse / Lake)]
  LOGS[(Logs / Traces)]
end
"#
        }
        Tag::Governance => {
            r#"
subgraph GOV["Governance (Safety Rails)"]
  AUTH[AuthN/AuthZ]
  PII[PII / Secrets Filter]
  INJ[Prompt Injection Guard]
  PROV[Provenance / Citation Policy]
end
"#
        }
        Tag::Obs => {
            r#"
subgraph OBS["Observability"]
  MET[Metrics]
  TRC[Traces]
  EVAL[Offline Eval / Regression Tests]
end
"#
        }
        Tag::Ds => {
            r#"
subgraph DSX["DS Project Workflows (as a workload)"]
  DSREQ[Project Brief / Hypothesis]
  DSPIP["EDA, Features, Model, Eval"]
  DSPKG["Packaging<br/>(Batch/Realtime)"]
end
"#
        }
    }
}

/// Header for the filtered architecture view.
pub const ARCHITECTURE_HEADER: &str =
    "flowchart LR\n%% === Agentic RAG Platform: Separation of Concerns ===\n";

/// Agent reasoning loop as a state diagram. Binary: either this or the
/// placeholder, never partially assembled.
pub const AGENT_STATE_DIAGRAM: &str = r#"stateDiagram-v2
  [*] --> Plan : goal
  Plan --> Retrieve : step / query
  Retrieve --> Ground : chunks
  Ground --> Reason : augmented prompt
  Reason --> Validate : draft answer
  Validate --> Decide : OK
  Validate --> Fallback : insufficient / conflict
  Fallback --> Retrieve : retry / tier-switch
  Decide --> Act : tool call / report
  Act --> Log : telemetry
  Log --> [*]
"#;

/// Shown when the agent view is requested but `agents` is off.
pub const AGENT_PLACEHOLDER: &str = "flowchart TB\nA[Enable 'Agents' to view the Agent Graph]";

/// Main DS project pipeline view.
pub const DS_PIPELINE: &str = r#"flowchart TB
  subgraph DS["Data Science Project Depth (Agentized)"]
    BRIEF["Project Brief Agent<br/>(scope, KPI, constraints)"]
    DATAAUD["Data QA Agent<br/>(nulls, drift, leakage checks)"]
    EDA["EDA Agent<br/>profiles, segments, anomalies"]
    FEAT["Feature Agent<br/>transforms, selection, leakage guard"]
    TRAIN["Training Agent<br/>CV, tuning, baselines"]
    EVAL["Evaluation Agent<br/>metrics, stability, fairness"]
    PKG["Packaging Agent<br/>batch/realtime, schema contracts"]
    DEP["Deployment Agent<br/>CI/CD, infra, rollout"]
    MON["Monitoring Agent<br/>drift, quality, alarms"]
    BRIEF --> DATAAUD --> EDA --> FEAT --> TRAIN --> EVAL --> PKG --> DEP --> MON
  end

  subgraph RAGX["RAG Grounding (Reusable)"]
    RET[Retriever]
    KB[(Domain KB / Policy / Docs)]
    RET <--> KB
  end

  subgraph TOOLX["Tools (Reusable)"]
    SQL[SQL Tool]
    PY[Python Tool]
    FS[File Tool]
    VIZ[Viz Tool]
  end

  BRIEF --> RET
  DATAAUD --> SQL
  EDA --> PY
  FEAT --> PY
  TRAIN --> PY
  EVAL --> VIZ
  PKG --> FS
  DEP --> FS
  MON --> SQL
"#;

/// Governance overlay appended to the DS pipeline when `governance` is on.
pub const DS_GOVERNANCE_OVERLAY: &str = r#"
  subgraph GOV["Governance Overlay (applies to ALL agents)"]
    SCHEMA["Schema contracts<br/>(Pydantic / JSON schema)"]
    PII2[PII masking]
    AUDIT[Audit logs]
  end
  BRIEF -.-> GOV
  EVAL -.-> GOV
  PKG -.-> GOV
"#;

/// Shown when the DS view is requested but `ds` is off.
pub const DS_PLACEHOLDER: &str =
    "flowchart TB\nA[Enable 'DS Project Depth' to view the DS pipeline]";

/// Hand-authored maximal architecture view with curated cross-links.
///
/// This is a fixed reference rendering, never synthesized by the assembly
/// engine; its link set deliberately differs from the rule table.
pub const COMPLETE_DIAGRAM: &str = r#"flowchart LR

%% =======================
%% API / UI LAYER
%% =======================
subgraph API["API / UI Layer (Request Surface)"]
  UI[Web UI / Chat UI]
  API1[FastAPI / Gateway]
  UI --> API1
end

%% =======================
%% ORCHESTRATOR
%% =======================
subgraph ORCH["Orchestrator (Control Plane)"]
  ROUTER[Router / Policy Engine]
  STATE[State Store]
  ROUTER <--> STATE
end

%% =======================
%% AGENTS
%% =======================
subgraph AG["Agents (Intent + Reasoning)"]
  PLAN[Planner Agent]
  SPEC["Specialized Agents<br/>(Policy, DS, Ops, Risk)"]
  VALID[Validator / Critic]
  PLAN --> SPEC --> VALID
end

%% =======================
%% RAG DATA PLANE
%% =======================
subgraph RAG["Retrieval (RAG Data Plane)"]
  EMB[Embed Query]
  VEC[Vector Search]
  CHUNK[Top-K Chunks]
  AUG[Prompt Augmentation]
  EMB --> VEC --> CHUNK --> AUG
end

%% =======================
%% TOOLS / ACTIONS
%% =======================
subgraph TOOLS["Tools / Actions (Execution)"]
  DBT["DB Tool<br/>(SQL / NoSQL / Warehouse)"]
  FILE["Doc Tool<br/>(PDF / DOC / HTML)"]
  WEB[Web Search Tool]
  ACT["Actions<br/>(APIs, Tickets, Emails)"]
end

%% =======================
%% DATA STORES
%% =======================
subgraph DATA["Data Stores"]
  VDB[(Vector DB)]
  POL[(Policy Docs)]
  DWH[(Warehouse / Lake)]
  LOGS[(Logs / Traces)]
end

%% =======================
%% GOVERNANCE
%% =======================
subgraph GOV["Governance (Safety Rails)"]
  AUTH[AuthN / AuthZ]
  PII[PII & Secrets Filter]
  INJ[Prompt Injection Guard]
  PROV[Provenance / Citation Policy]
end

%% =======================
%% OBSERVABILITY
%% =======================
subgraph OBS["Observability"]
  MET[Metrics]
  TRC[Traces]
  EVAL[Offline Eval / Regression Tests]
end

%% =======================
%% DS WORKLOAD
%% =======================
subgraph DSX["Data Science Project (Workload)"]
  DSREQ[Problem Statement / Hypothesis]
  DSPIP["EDA, Features, Model, Eval"]
  DSPKG["Packaging<br/>(Batch / Realtime)"]
end

%% =======================
%% CROSS-LINKS
%% =======================
API1 --> ROUTER
ROUTER --> PLAN
VALID --> ROUTER

SPEC --> EMB
AUG --> SPEC

VEC <--> VDB
CHUNK --> POL

SPEC --> DBT
SPEC --> FILE
SPEC --> WEB
VALID --> ACT

DBT <--> DWH
FILE <--> POL
ACT --> DWH

API1 --> MET
ROUTER --> TRC
VALID --> TRC
ACT --> TRC
TRC --> LOGS

API1 --> AUTH
SPEC --> PII
SPEC --> INJ
VALID --> PROV

PLAN --> DSREQ
DSREQ --> DSPIP
DSPIP --> DSPKG
DSPKG --> ACT
"#;

// ============================================================================
// Auxiliary template catalog
// ============================================================================

/// One named template in the auxiliary catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateEntry {
    /// Lookup key within the category.
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub code: &'static str,
}

/// A catalog category grouping related templates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateCategory {
    /// Lookup key for the category.
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub templates: &'static [TemplateEntry],
}

/// Look up a catalog category by name.
pub fn category(name: &str) -> Option<&'static TemplateCategory> {
    CATALOG.iter().find(|c| c.name == name)
}

/// Look up one template by category and name.
pub fn template(category_name: &str, template_name: &str) -> Option<&'static TemplateEntry> {
    category(category_name)?
        .templates
        .iter()
        .find(|t| t.name == template_name)
}

/// The full auxiliary catalog, grouped by category.
pub const CATALOG: &[TemplateCategory] = &[
    TemplateCategory {
        name: "sequence",
        title: "Sequence Diagrams",
        description: "Show interactions between components over time",
        templates: &[
            TemplateEntry {
                name: "api_request_flow",
                title: "API Request Flow",
                description: "Shows the flow of an API request through the system",
                code: r#"sequenceDiagram
    participant Client
    participant API Gateway
    participant Auth Service
    participant Orchestrator
    participant Agent
    participant RAG
    participant Database

    Client->>API Gateway: HTTP Request
    API Gateway->>Auth Service: Validate Token
    Auth Service-->>API Gateway: Token Valid
    API Gateway->>Orchestrator: Forward Request
    Orchestrator->>Agent: Route to Agent
    Agent->>RAG: Query Knowledge Base
    RAG->>Database: Vector Search
    Database-->>RAG: Relevant Chunks
    RAG-->>Agent: Augmented Context
    Agent-->>Orchestrator: Response
    Orchestrator-->>API Gateway: Formatted Response
    API Gateway-->>Client: HTTP Response
"#,
            },
            TemplateEntry {
                name: "agent_reasoning",
                title: "Agent Reasoning Loop",
                description: "Shows the internal reasoning process of an agent",
                code: r#"sequenceDiagram
    participant User
    participant Planner
    participant Retriever
    participant Reasoner
    participant Validator
    participant Tools

    User->>Planner: Query
    Planner->>Planner: Decompose into steps

    loop For each step
        Planner->>Retriever: Get context
        Retriever-->>Planner: Relevant docs
        Planner->>Reasoner: Reason with context
        Reasoner->>Validator: Validate output

        alt Valid
            Validator-->>Reasoner: Approved
        else Invalid
            Validator->>Retriever: Request more context
        end

        opt Needs tool
            Reasoner->>Tools: Execute action
            Tools-->>Reasoner: Result
        end
    end

    Planner-->>User: Final Answer
"#,
            },
            TemplateEntry {
                name: "data_pipeline",
                title: "Data Pipeline Flow",
                description: "Shows data flowing through a processing pipeline",
                code: r#"sequenceDiagram
    participant Source as Data Source
    participant Ingestion
    participant Transform
    participant Validate
    participant Store as Data Store
    participant Monitor

    Source->>Ingestion: Raw Data
    Ingestion->>Monitor: Log ingestion start
    Ingestion->>Transform: Cleaned Data
    Transform->>Validate: Transformed Data

    alt Validation Passed
        Validate->>Store: Valid Data
        Store->>Monitor: Log success
    else Validation Failed
        Validate->>Monitor: Log errors
        Validate->>Source: Request retry
    end
"#,
            },
        ],
    },
    TemplateCategory {
        name: "er",
        title: "ER Diagrams",
        description: "Entity-Relationship diagrams for database design",
        templates: &[
            TemplateEntry {
                name: "agent_system",
                title: "Agent System Schema",
                description: "Database schema for an agent-based system",
                code: r#"erDiagram
    USERS ||--o{ SESSIONS : has
    USERS ||--o{ CUSTOM_DIAGRAMS : creates
    USERS ||--o{ PREFERENCES : has

    SESSIONS ||--o{ MESSAGES : contains
    SESSIONS ||--o{ AGENT_RUNS : triggers

    AGENT_RUNS ||--o{ TOOL_CALLS : makes
    AGENT_RUNS ||--o{ RETRIEVALS : performs

    MESSAGES {
        int id PK
        int session_id FK
        string role
        text content
        timestamp created_at
    }

    USERS {
        int id PK
        string email
        string name
        timestamp created_at
    }

    SESSIONS {
        int id PK
        int user_id FK
        string status
        timestamp created_at
    }

    AGENT_RUNS {
        int id PK
        int session_id FK
        string agent_type
        string status
        json metadata
        timestamp started_at
        timestamp completed_at
    }

    TOOL_CALLS {
        int id PK
        int agent_run_id FK
        string tool_name
        json input
        json output
        timestamp called_at
    }

    RETRIEVALS {
        int id PK
        int agent_run_id FK
        string query
        json results
        float score
        timestamp retrieved_at
    }

    CUSTOM_DIAGRAMS {
        int id PK
        int user_id FK
        string name
        text mermaid_code
        boolean is_public
        timestamp created_at
    }

    PREFERENCES {
        int id PK
        int user_id FK
        json settings
        timestamp updated_at
    }
"#,
            },
            TemplateEntry {
                name: "ml_pipeline",
                title: "ML Pipeline Schema",
                description: "Database schema for ML pipeline tracking",
                code: r#"erDiagram
    PROJECTS ||--o{ EXPERIMENTS : contains
    EXPERIMENTS ||--o{ RUNS : has
    RUNS ||--o{ METRICS : records
    RUNS ||--o{ ARTIFACTS : produces
    RUNS ||--o{ PARAMETERS : uses

    PROJECTS {
        int id PK
        string name
        string description
        timestamp created_at
    }

    EXPERIMENTS {
        int id PK
        int project_id FK
        string name
        string hypothesis
        string status
    }

    RUNS {
        int id PK
        int experiment_id FK
        string run_name
        string status
        timestamp started_at
        timestamp completed_at
    }

    METRICS {
        int id PK
        int run_id FK
        string name
        float value
        int step
    }

    ARTIFACTS {
        int id PK
        int run_id FK
        string name
        string path
        string type
    }

    PARAMETERS {
        int id PK
        int run_id FK
        string name
        string value
    }
"#,
            },
        ],
    },
    TemplateCategory {
        name: "class",
        title: "Class Diagrams",
        description: "Object-oriented class structures",
        templates: &[
            TemplateEntry {
                name: "agent_architecture",
                title: "Agent Architecture Classes",
                description: "Class diagram for agent system architecture",
                code: r#"classDiagram
    class Agent {
        <<abstract>>
        +String name
        +String description
        +List~Tool~ tools
        +run(query) Response
        +plan(goal) List~Step~
    }

    class PlannerAgent {
        +decompose(goal) List~Task~
        +prioritize(tasks) List~Task~
        +route(task) Agent
    }

    class SpecializedAgent {
        +String specialty
        +execute(task) Result
        +validate(result) bool
    }

    class RAGAgent {
        +Retriever retriever
        +retrieve(query) List~Document~
        +augment(query, docs) Prompt
    }

    class Tool {
        <<interface>>
        +String name
        +String description
        +execute(input) Output
    }

    class SQLTool {
        +Connection db
        +query(sql) Results
    }

    class APITool {
        +String endpoint
        +call(params) Response
    }

    class Orchestrator {
        +List~Agent~ agents
        +StateStore state
        +route(request) Agent
        +execute(request) Response
    }

    Agent <|-- PlannerAgent
    Agent <|-- SpecializedAgent
    Agent <|-- RAGAgent
    Tool <|.. SQLTool
    Tool <|.. APITool
    Agent "1" *-- "many" Tool
    Orchestrator "1" *-- "many" Agent
"#,
            },
            TemplateEntry {
                name: "data_models",
                title: "Data Models",
                description: "Class diagram for data models",
                code: r#"classDiagram
    class BaseModel {
        <<abstract>>
        +int id
        +datetime created_at
        +datetime updated_at
        +save()
        +delete()
    }

    class User {
        +String email
        +String name
        +String password_hash
        +authenticate(password) bool
        +get_preferences() Preferences
    }

    class Diagram {
        +String name
        +String description
        +String mermaid_code
        +DiagramType type
        +bool is_public
        +render() SVG
        +export(format) File
    }

    class Session {
        +User user
        +String status
        +List~Message~ messages
        +add_message(content)
        +get_history() List
    }

    class Message {
        +Session session
        +String role
        +String content
    }

    BaseModel <|-- User
    BaseModel <|-- Diagram
    BaseModel <|-- Session
    BaseModel <|-- Message
    User "1" -- "many" Diagram
    User "1" -- "many" Session
    Session "1" -- "many" Message
"#,
            },
        ],
    },
    TemplateCategory {
        name: "gantt",
        title: "Gantt Charts",
        description: "Project timelines and scheduling",
        templates: &[
            TemplateEntry {
                name: "ml_project",
                title: "ML Project Timeline",
                description: "Gantt chart for ML project phases",
                code: r#"gantt
    title ML Project Timeline
    dateFormat  YYYY-MM-DD

    section Discovery
    Problem Definition     :done, d1, 2024-01-01, 7d
    Data Assessment        :done, d2, after d1, 5d
    Feasibility Study      :done, d3, after d2, 3d

    section Data Preparation
    Data Collection        :active, dp1, after d3, 10d
    Data Cleaning          :dp2, after dp1, 7d
    Feature Engineering    :dp3, after dp2, 10d

    section Modeling
    Baseline Models        :m1, after dp3, 5d
    Model Selection        :m2, after m1, 7d
    Hyperparameter Tuning  :m3, after m2, 7d

    section Evaluation
    Model Validation       :e1, after m3, 5d
    A/B Testing           :e2, after e1, 14d

    section Deployment
    Packaging             :dep1, after e2, 5d
    CI/CD Setup           :dep2, after dep1, 3d
    Production Deploy     :milestone, dep3, after dep2, 0d

    section Monitoring
    Setup Monitoring      :mon1, after dep3, 5d
    Drift Detection       :mon2, after mon1, 30d
"#,
            },
            TemplateEntry {
                name: "sprint_plan",
                title: "Sprint Planning",
                description: "Two-week sprint plan",
                code: r#"gantt
    title Sprint 23 - Agent Features
    dateFormat  YYYY-MM-DD

    section Backend
    API endpoints          :b1, 2024-02-01, 3d
    Database models        :b2, 2024-02-01, 2d
    Agent integration      :b3, after b1, 4d

    section Frontend
    UI components          :f1, 2024-02-01, 4d
    State management       :f2, after f1, 2d
    API integration        :f3, after f2, 2d

    section Testing
    Unit tests             :t1, after b3, 2d
    Integration tests      :t2, after f3, 2d
    E2E tests              :t3, after t2, 2d

    section Release
    Code review            :r1, after t3, 1d
    Deploy to staging      :r2, after r1, 1d
    Production release     :milestone, r3, after r2, 0d
"#,
            },
        ],
    },
    TemplateCategory {
        name: "pie",
        title: "Pie Charts",
        description: "Distribution and proportion visualization",
        templates: &[
            TemplateEntry {
                name: "system_usage",
                title: "System Usage Distribution",
                description: "Pie chart showing system component usage",
                code: r#"pie showData
    title System Resource Usage
    "RAG Retrieval" : 35
    "Agent Reasoning" : 25
    "Tool Execution" : 20
    "API Processing" : 12
    "Other" : 8
"#,
            },
            TemplateEntry {
                name: "error_distribution",
                title: "Error Distribution",
                description: "Distribution of error types",
                code: r#"pie showData
    title Error Types Distribution
    "Validation Errors" : 40
    "Timeout Errors" : 25
    "Auth Errors" : 15
    "Rate Limit" : 12
    "Unknown" : 8
"#,
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for tag in Tag::ALL {
            assert_eq!(tag.as_str().parse::<Tag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = "frontend".parse::<Tag>().unwrap_err();
        assert_eq!(err.0, "frontend");
        assert!(err.to_string().contains("unknown tag 'frontend'"));
    }

    #[test]
    fn test_tag_serde_names() {
        let json = serde_json::to_string(&Tag::Orchestrator).unwrap();
        assert_eq!(json, "\"orchestrator\"");
        let tag: Tag = serde_json::from_str("\"ds\"").unwrap();
        assert_eq!(tag, Tag::Ds);
    }

    #[test]
    fn test_every_tag_has_a_fragment() {
        for tag in Tag::ALL {
            let frag = fragment(tag);
            assert!(frag.contains("subgraph"), "{tag} fragment missing subgraph");
            assert!(frag.contains("end"), "{tag} fragment missing end");
        }
    }

    #[test]
    fn test_catalog_lookup() {
        let cat = category("sequence").unwrap();
        assert_eq!(cat.templates.len(), 3);

        let tpl = template("er", "ml_pipeline").unwrap();
        assert!(tpl.code.starts_with("erDiagram"));

        assert!(category("flow").is_none());
        assert!(template("sequence", "missing").is_none());
        assert!(template("missing", "api_request_flow").is_none());
    }

    #[test]
    fn test_catalog_names_unique() {
        for cat in CATALOG {
            let mut seen = std::collections::HashSet::new();
            for tpl in cat.templates {
                assert!(seen.insert(tpl.name), "duplicate template {}", tpl.name);
            }
        }
    }

    #[test]
    fn test_complete_diagram_is_maximal() {
        // The curated complete view contains every subgraph id
        for id in ["API", "ORCH", "AG", "RAG", "TOOLS", "DATA", "GOV", "OBS", "DSX"] {
            assert!(
                COMPLETE_DIAGRAM.contains(&format!("subgraph {}", id)),
                "complete diagram missing {}",
                id
            );
        }
    }
}
