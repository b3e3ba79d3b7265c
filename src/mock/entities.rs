//! Backend-shaped records served by the mock service.
//!
//! Field names follow the snake_case JSON the real backend returns so UI code
//! does not care which implementation is active.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ResourceKind;

/// A record stored in a mock collection
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// Refresh `updated_at` where the record has one
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

/// A resource that callers can create from a draft
pub trait Creatable: Resource {
    type Draft: Send + 'static;

    fn build(draft: Self::Draft, id: String, now: DateTime<Utc>) -> Self;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewDataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
}

impl Resource for BackendDataSource {
    const KIND: ResourceKind = ResourceKind::DataSource;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for BackendDataSource {
    type Draft = NewDataSource;

    fn build(draft: NewDataSource, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            connection_type: draft.connection_type,
            host: draft.host,
            port: draft.port,
            database: draft.database,
            username: draft.username,
            status: "connected".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub widgets: Vec<Value>,
    pub is_public: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewDashboard {
    pub name: String,
    pub description: Option<String>,
    pub widgets: Vec<Value>,
    pub is_public: bool,
}

impl Resource for Dashboard {
    const KIND: ResourceKind = ResourceKind::Dashboard;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for Dashboard {
    type Draft = NewDashboard;

    fn build(draft: NewDashboard, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            widgets: draft.widgets,
            is_public: draft.is_public,
            created_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataMart {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub data_source_id: String,
    pub query: String,
    pub row_count: u64,
    pub status: String,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewDataMart {
    pub name: String,
    pub description: Option<String>,
    pub data_source_id: String,
    pub query: String,
}

impl Resource for DataMart {
    const KIND: ResourceKind = ResourceKind::DataMart;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for DataMart {
    type Draft = NewDataMart;

    // A new mart has never been refreshed.
    fn build(draft: NewDataMart, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            data_source_id: draft.data_source_id,
            query: draft.query,
            row_count: 0,
            status: "pending".to_string(),
            last_refreshed: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Active,
    Paused,
}

impl PipelineStatus {
    pub fn toggled(self) -> Self {
        match self {
            PipelineStatus::Active => PipelineStatus::Paused,
            PipelineStatus::Paused => PipelineStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub source_id: String,
    pub destination_id: String,
    pub schedule: Option<String>,
    pub status: PipelineStatus,
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPipeline {
    pub name: String,
    pub description: Option<String>,
    pub source_id: String,
    pub destination_id: String,
    pub schedule: Option<String>,
}

impl Resource for Pipeline {
    const KIND: ResourceKind = ResourceKind::Pipeline;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for Pipeline {
    type Draft = NewPipeline;

    fn build(draft: NewPipeline, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            source_id: draft.source_id,
            destination_id: draft.destination_id,
            schedule: draft.schedule,
            status: PipelineStatus::Active,
            last_run: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Pipeline run lifecycle: `running` ends in `success` or `failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: String,
    pub pipeline_id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: u64,
    pub error_message: Option<String>,
}

impl PipelineRun {
    pub fn started(id: String, pipeline_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pipeline_id: pipeline_id.to_string(),
            status: RunStatus::Running,
            started_at: now,
            completed_at: None,
            records_processed: 0,
            error_message: None,
        }
    }
}

impl Resource for PipelineRun {
    const KIND: ResourceKind = ResourceKind::PipelineRun;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub organization_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub organization_id: Option<String>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for User {
    type Draft = NewUser;

    fn build(draft: NewUser, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            organization_id: draft.organization_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for Organization {
    const KIND: ResourceKind = ResourceKind::Organization;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

impl Resource for Role {
    const KIND: ResourceKind = ResourceKind::Role;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub id: String,
    pub name: String,
    pub pipeline_id: String,
    pub cron_expression: String,
    pub enabled: bool,
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewScheduler {
    pub name: String,
    pub pipeline_id: String,
    pub cron_expression: String,
}

impl Resource for Scheduler {
    const KIND: ResourceKind = ResourceKind::Scheduler;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Creatable for Scheduler {
    type Draft = NewScheduler;

    fn build(draft: NewScheduler, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            pipeline_id: draft.pipeline_id,
            cron_expression: draft.cron_expression,
            enabled: true,
            next_run: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of a successful connection test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTest {
    pub status: String,
    pub message: String,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
    pub message: String,
}

/// Summary counts for the overview page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub data_sources: usize,
    pub dashboards: usize,
    pub data_marts: usize,
    pub pipelines: usize,
    pub active_pipelines: usize,
    pub users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_terminal_states() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn pipeline_status_toggles() {
        assert_eq!(PipelineStatus::Active.toggled(), PipelineStatus::Paused);
        assert_eq!(PipelineStatus::Paused.toggled(), PipelineStatus::Active);
    }

    #[test]
    fn drafts_accept_partial_json() {
        let draft: NewDashboard =
            serde_json::from_value(serde_json::json!({ "name": "Revenue" })).unwrap();
        let dashboard = Dashboard::build(draft, "9".to_string(), Utc::now());
        assert_eq!(dashboard.name, "Revenue");
        assert!(dashboard.widgets.is_empty());
        assert_eq!(dashboard.created_at, dashboard.updated_at);
    }

    #[test]
    fn data_source_type_field_is_renamed() {
        let ds = BackendDataSource::build(
            NewDataSource {
                name: "Warehouse".to_string(),
                connection_type: "postgresql".to_string(),
                ..Default::default()
            },
            "4".to_string(),
            Utc::now(),
        );
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["type"], "postgresql");
        assert_eq!(json["status"], "connected");
    }
}
