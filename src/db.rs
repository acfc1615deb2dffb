//! SQLite database with Diesel ORM
//!
//! Stores user-saved diagrams and usage history. The schema is created on
//! open; individual create/update/delete calls rely on SQLite's row-level
//! atomicity and make no cross-record transactional guarantees.

use crate::schema::*;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::path::Path;

/// Walk up the directory tree to find an .archboard folder (like git finds
/// .git). Can be overridden with the ARCHBOARD_DB_PATH env var.
fn get_db_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("ARCHBOARD_DB_PATH") {
        return std::path::PathBuf::from(path);
    }

    if let Ok(current_dir) = std::env::current_dir() {
        let mut dir = current_dir.as_path();
        loop {
            let archboard_dir = dir.join(".archboard");
            if archboard_dir.is_dir() {
                return archboard_dir.join("archboard.db");
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    // No .archboard found - default to current directory
    std::path::PathBuf::from(".archboard/archboard.db")
}

/// Current schema version for archboard
pub const CURRENT_SCHEMA: StoreSchema = StoreSchema {
    major: 1,
    minor: 0,
    patch: 0,
    name: "diagram-store",
    features: &["saved_diagrams", "usage_history"],
};

/// Describes the version and capabilities of the schema
#[derive(Debug, Clone)]
pub struct StoreSchema {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub name: &'static str,
    pub features: &'static [&'static str],
}

impl StoreSchema {
    pub fn version_string(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(&feature)
    }
}

impl std::fmt::Display for StoreSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{} ({})", self.version_string(), self.name)
    }
}

// ============================================================================
// Diesel Models
// ============================================================================

/// Insertable schema version
#[derive(Insertable)]
#[diesel(table_name = schema_versions)]
struct NewSchemaVersion<'a> {
    version: &'a str,
    name: &'a str,
    features: &'a str,
    introduced_at: &'a str,
}

/// Fields supplied when saving a new diagram.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DiagramDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_diagram_type")]
    pub diagram_type: String,
    pub diagram_text: String,
    #[serde(default)]
    pub filters_json: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_by: Option<String>,
}

fn default_diagram_type() -> String {
    "flowchart".to_string()
}

/// Insertable saved diagram
#[derive(Insertable)]
#[diesel(table_name = saved_diagrams)]
struct NewSavedDiagram<'a> {
    name: &'a str,
    description: Option<&'a str>,
    diagram_type: &'a str,
    diagram_text: &'a str,
    filters_json: Option<&'a str>,
    is_public: bool,
    created_by: Option<&'a str>,
    created_at: &'a str,
    updated_at: &'a str,
}

/// Queryable saved diagram
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[diesel(table_name = saved_diagrams)]
pub struct SavedDiagram {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub diagram_type: String,
    pub diagram_text: String,
    pub filters_json: Option<String>,
    pub is_public: bool,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update for a saved diagram. `None` fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize, AsChangeset)]
#[diesel(table_name = saved_diagrams)]
pub struct DiagramPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagram_text: Option<String>,
    #[serde(default)]
    pub filters_json: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl DiagramPatch {
    /// A patch with nothing to change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.diagram_text.is_none()
            && self.filters_json.is_none()
            && self.is_public.is_none()
    }
}

/// Insertable usage event
#[derive(Insertable)]
#[diesel(table_name = usage_history)]
struct NewUsageEvent<'a> {
    user_id: Option<&'a str>,
    action: &'a str,
    details_json: Option<&'a str>,
    created_at: &'a str,
}

/// Queryable usage event
#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = usage_history)]
pub struct UsageEvent {
    pub id: i32,
    pub user_id: Option<String>,
    pub action: String,
    pub details_json: Option<String>,
    pub created_at: String,
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
}

/// Error type for database operations
#[derive(Debug)]
pub enum DbError {
    Connection(String),
    Query(diesel::result::Error),
    Pool(diesel::r2d2::Error),
    Validation(String),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Connection(msg) => write!(f, "Connection error: {}", msg),
            DbError::Query(e) => write!(f, "Query error: {}", e),
            DbError::Pool(e) => write!(f, "Pool error: {}", e),
            DbError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DbError {}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Query(e)
    }
}

impl From<diesel::r2d2::Error> for DbError {
    fn from(e: diesel::r2d2::Error) -> Self {
        DbError::Pool(e)
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

impl Database {
    /// Get the database path that will be used
    pub fn db_path() -> std::path::PathBuf {
        get_db_path()
    }

    /// Create a new database at a custom path
    pub fn new(path: &str) -> Result<Self> {
        Self::open_at(path)
    }

    /// Open database at default path (respects ARCHBOARD_DB_PATH env var)
    pub fn open() -> Result<Self> {
        let path = get_db_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        Self::open_at(&path)
    }

    /// Open database at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| DbError::Connection(e.to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                version TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                features TEXT NOT NULL,
                introduced_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&mut conn)?;

        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_diagrams (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                diagram_type TEXT NOT NULL DEFAULT 'flowchart',
                diagram_text TEXT NOT NULL,
                filters_json TEXT,
                is_public BOOLEAN NOT NULL DEFAULT 0,
                created_by TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&mut conn)?;

        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS usage_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                user_id TEXT,
                action TEXT NOT NULL,
                details_json TEXT,
                created_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&mut conn)?;

        diesel::sql_query(
            "CREATE INDEX IF NOT EXISTS idx_diagrams_public ON saved_diagrams(is_public)",
        )
        .execute(&mut conn)?;
        diesel::sql_query(
            "CREATE INDEX IF NOT EXISTS idx_diagrams_type ON saved_diagrams(diagram_type)",
        )
        .execute(&mut conn)?;
        diesel::sql_query(
            "CREATE INDEX IF NOT EXISTS idx_history_created_at ON usage_history(created_at)",
        )
        .execute(&mut conn)?;

        self.register_schema(&CURRENT_SCHEMA)?;
        Ok(())
    }

    fn register_schema(&self, schema: &StoreSchema) -> Result<()> {
        let mut conn = self.get_conn()?;
        let now = chrono::Local::now().to_rfc3339();
        let features_json = serde_json::to_string(&schema.features).unwrap_or_default();
        let version = schema.version_string();

        let new_schema = NewSchemaVersion {
            version: &version,
            name: schema.name,
            features: &features_json,
            introduced_at: &now,
        };

        diesel::insert_or_ignore_into(schema_versions::table)
            .values(&new_schema)
            .execute(&mut conn)?;

        Ok(())
    }

    // ========================================================================
    // Saved Diagram Operations
    // ========================================================================

    /// Save a new diagram, returning its id.
    pub fn create_diagram(&self, draft: &DiagramDraft) -> Result<i32> {
        if draft.name.trim().is_empty() {
            return Err(DbError::Validation("Diagram name must not be empty".to_string()));
        }
        if draft.diagram_text.trim().is_empty() {
            return Err(DbError::Validation("Diagram text must not be empty".to_string()));
        }

        let mut conn = self.get_conn()?;
        let now = chrono::Local::now().to_rfc3339();

        let new_diagram = NewSavedDiagram {
            name: &draft.name,
            description: draft.description.as_deref(),
            diagram_type: &draft.diagram_type,
            diagram_text: &draft.diagram_text,
            filters_json: draft.filters_json.as_deref(),
            is_public: draft.is_public,
            created_by: draft.created_by.as_deref(),
            created_at: &now,
            updated_at: &now,
        };

        diesel::insert_into(saved_diagrams::table)
            .values(&new_diagram)
            .execute(&mut conn)?;

        let id: i32 =
            diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
                .first(&mut conn)?;

        Ok(id)
    }

    /// Fetch one diagram by id.
    pub fn get_diagram(&self, id: i32) -> Result<Option<SavedDiagram>> {
        let mut conn = self.get_conn()?;
        let diagram = saved_diagrams::table
            .filter(saved_diagrams::id.eq(id))
            .first::<SavedDiagram>(&mut conn)
            .optional()?;
        Ok(diagram)
    }

    /// List diagrams, newest first.
    ///
    /// Without an owner only public rows are returned; with an owner their
    /// private rows are included as well. `type_filter` narrows by the
    /// stored diagram type.
    pub fn list_diagrams(
        &self,
        owner: Option<&str>,
        type_filter: Option<&str>,
    ) -> Result<Vec<SavedDiagram>> {
        let mut conn = self.get_conn()?;

        let mut query = saved_diagrams::table.into_boxed();

        query = match owner {
            Some(user) => query.filter(
                saved_diagrams::is_public
                    .eq(true)
                    .or(saved_diagrams::created_by.eq(user.to_string())),
            ),
            None => query.filter(saved_diagrams::is_public.eq(true)),
        };

        if let Some(diagram_type) = type_filter {
            query = query.filter(saved_diagrams::diagram_type.eq(diagram_type.to_string()));
        }

        let diagrams = query
            .order(saved_diagrams::updated_at.desc())
            .load::<SavedDiagram>(&mut conn)?;
        Ok(diagrams)
    }

    /// Apply a partial update. Returns `false` when the patch is empty or no
    /// row matched; an empty patch never touches the store.
    pub fn update_diagram(&self, id: i32, patch: &DiagramPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut conn = self.get_conn()?;
        let now = chrono::Local::now().to_rfc3339();

        let rows = diesel::update(saved_diagrams::table.filter(saved_diagrams::id.eq(id)))
            .set((patch, saved_diagrams::updated_at.eq(&now)))
            .execute(&mut conn)?;

        Ok(rows > 0)
    }

    /// Delete a diagram. Returns `false` when no row matched.
    pub fn delete_diagram(&self, id: i32) -> Result<bool> {
        let mut conn = self.get_conn()?;
        let rows = diesel::delete(saved_diagrams::table.filter(saved_diagrams::id.eq(id)))
            .execute(&mut conn)?;
        Ok(rows > 0)
    }

    // ========================================================================
    // Usage History Operations
    // ========================================================================

    /// Record a usage event.
    pub fn log_usage(
        &self,
        action: &str,
        details: Option<&serde_json::Value>,
        user: Option<&str>,
    ) -> Result<i32> {
        let mut conn = self.get_conn()?;
        let now = chrono::Local::now().to_rfc3339();
        let details_json = details.map(|d| d.to_string());

        let new_event = NewUsageEvent {
            user_id: user,
            action,
            details_json: details_json.as_deref(),
            created_at: &now,
        };

        diesel::insert_into(usage_history::table)
            .values(&new_event)
            .execute(&mut conn)?;

        let id: i32 =
            diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
                .first(&mut conn)?;

        Ok(id)
    }

    /// Most recent usage events, newest first.
    pub fn recent_usage(&self, limit: i64) -> Result<Vec<UsageEvent>> {
        let mut conn = self.get_conn()?;
        let events = usage_history::table
            .order(usage_history::id.desc())
            .limit(limit)
            .load::<UsageEvent>(&mut conn)?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open_at(&path).unwrap();
        (dir, db)
    }

    fn draft(name: &str) -> DiagramDraft {
        DiagramDraft {
            name: name.to_string(),
            description: Some("a test diagram".to_string()),
            diagram_type: "flowchart".to_string(),
            diagram_text: "flowchart LR\nA --> B".to_string(),
            filters_json: None,
            is_public: true,
            created_by: None,
        }
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let (_dir, db) = temp_db();

        let id = db.create_diagram(&draft("pipeline")).unwrap();
        let stored = db.get_diagram(id).unwrap().unwrap();

        assert_eq!(stored.name, "pipeline");
        assert_eq!(stored.diagram_text, "flowchart LR\nA --> B");
        assert!(stored.is_public);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_dir, db) = temp_db();
        assert!(db.get_diagram(42).unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let (_dir, db) = temp_db();

        let mut unnamed = draft("");
        unnamed.name = "  ".to_string();
        assert!(matches!(
            db.create_diagram(&unnamed),
            Err(DbError::Validation(_))
        ));

        let mut empty = draft("empty");
        empty.diagram_text = String::new();
        assert!(matches!(db.create_diagram(&empty), Err(DbError::Validation(_))));
    }

    #[test]
    fn test_list_without_owner_returns_public_only() {
        let (_dir, db) = temp_db();

        db.create_diagram(&draft("public one")).unwrap();
        let mut private = draft("private one");
        private.is_public = false;
        private.created_by = Some("ada".to_string());
        db.create_diagram(&private).unwrap();

        let listed = db.list_diagrams(None, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "public one");
    }

    #[test]
    fn test_list_with_owner_includes_their_private_rows() {
        let (_dir, db) = temp_db();

        db.create_diagram(&draft("public one")).unwrap();

        let mut mine = draft("mine");
        mine.is_public = false;
        mine.created_by = Some("ada".to_string());
        db.create_diagram(&mine).unwrap();

        let mut theirs = draft("theirs");
        theirs.is_public = false;
        theirs.created_by = Some("brian".to_string());
        db.create_diagram(&theirs).unwrap();

        let listed = db.list_diagrams(Some("ada"), None).unwrap();
        let names: Vec<&str> = listed.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"public one"));
        assert!(names.contains(&"mine"));
        assert!(!names.contains(&"theirs"));
    }

    #[test]
    fn test_list_type_filter() {
        let (_dir, db) = temp_db();

        db.create_diagram(&draft("flow")).unwrap();
        let mut seq = draft("seq");
        seq.diagram_type = "sequence".to_string();
        db.create_diagram(&seq).unwrap();

        let listed = db.list_diagrams(None, Some("sequence")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "seq");
    }

    #[test]
    fn test_update_partial_fields() {
        let (_dir, db) = temp_db();
        let id = db.create_diagram(&draft("before")).unwrap();

        let patch = DiagramPatch {
            name: Some("after".to_string()),
            is_public: Some(false),
            ..Default::default()
        };
        assert!(db.update_diagram(id, &patch).unwrap());

        let stored = db.get_diagram(id).unwrap().unwrap();
        assert_eq!(stored.name, "after");
        assert!(!stored.is_public);
        // Untouched fields survive
        assert_eq!(stored.diagram_text, "flowchart LR\nA --> B");
    }

    #[test]
    fn test_empty_update_fails_and_changes_nothing() {
        let (_dir, db) = temp_db();
        let id = db.create_diagram(&draft("unchanged")).unwrap();
        let before = db.get_diagram(id).unwrap().unwrap();

        assert!(!db.update_diagram(id, &DiagramPatch::default()).unwrap());

        let after = db.get_diagram(id).unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let (_dir, db) = temp_db();
        let patch = DiagramPatch {
            name: Some("ghost".to_string()),
            ..Default::default()
        };
        assert!(!db.update_diagram(99, &patch).unwrap());
    }

    #[test]
    fn test_delete_then_get_reports_missing() {
        let (_dir, db) = temp_db();
        let id = db.create_diagram(&draft("doomed")).unwrap();

        assert!(db.delete_diagram(id).unwrap());
        assert!(db.get_diagram(id).unwrap().is_none());
        assert!(!db.delete_diagram(id).unwrap());
    }

    #[test]
    fn test_usage_history_round_trip() {
        let (_dir, db) = temp_db();

        db.log_usage("generate", Some(&serde_json::json!({"diagram_type": "architecture"})), None)
            .unwrap();
        db.log_usage("save", None, Some("ada")).unwrap();

        let events = db.recent_usage(10).unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert_eq!(events[0].action, "save");
        assert_eq!(events[0].user_id.as_deref(), Some("ada"));
        assert_eq!(events[1].action, "generate");
        assert!(events[1].details_json.as_deref().unwrap().contains("architecture"));
    }

    #[test]
    fn test_schema_registration() {
        let (_dir, db) = temp_db();
        // Re-opening the same path must not fail on the unique version row
        drop(db);
        let _again = Database::open_at(_dir.path().join("test.db")).unwrap();
        assert!(CURRENT_SCHEMA.has_feature("saved_diagrams"));
    }
}
