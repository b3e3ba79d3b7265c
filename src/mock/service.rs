use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::MockConfig;
use crate::errors::{MockError, MockResult, ResourceKind};
use crate::mock::entities::{
    BackendDataSource, ConnectionTest, Creatable, Dashboard, DataMart, Deleted, Organization,
    OverviewStats, Pipeline, PipelineRun, PipelineStatus, QueryResult, Resource, Role, RunStatus,
    Scheduler, User,
};
use crate::mock::runs::RunTracker;
use crate::mock::store::{MockStore, Stored};

const REFRESH_ROW_COUNT: RangeInclusive<u64> = 1_000..=100_000;
const RUN_RECORD_COUNT: RangeInclusive<u64> = 1_000..=50_000;
const CONNECTION_RESPONSE_MS: RangeInclusive<u64> = 20..=250;
const QUERY_EXECUTION_MS: RangeInclusive<u64> = 50..=500;

/// CRUD surface shared by every mutable resource.
///
/// The mock service implements it in memory; a client for the real backend
/// can implement the same trait so callers stay agnostic.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Entity: Creatable;

    async fn list(&self) -> MockResult<Vec<Self::Entity>>;

    async fn get(&self, id: &str) -> MockResult<Self::Entity>;

    async fn create(
        &self,
        draft: <Self::Entity as Creatable>::Draft,
    ) -> MockResult<Self::Entity>;

    async fn update(&self, id: &str, patch: Value) -> MockResult<Self::Entity>;

    async fn delete(&self, id: &str) -> MockResult<Deleted>;
}

struct Shared {
    config: MockConfig,
    store: MockStore,
    runs: RunTracker,
}

/// In-memory stand-in for the DataMantri backend.
///
/// Cloning is cheap and every clone shares the same session state.
#[derive(Clone)]
pub struct MockService {
    shared: Arc<Shared>,
}

impl MockService {
    /// A session over the demo seed data
    pub fn seeded(config: MockConfig) -> Self {
        Self::with_store(config, MockStore::seeded())
    }

    /// A session with every collection empty
    pub fn new(config: MockConfig) -> Self {
        Self::with_store(config, MockStore::empty())
    }

    /// Out-of-range or non-finite rates are clamped before use
    pub fn with_store(config: MockConfig, store: MockStore) -> Self {
        if let Err(err) = config.validate() {
            warn!("{}; clamping failure rates", err);
        }
        let config = config.sanitized();
        Self {
            shared: Arc::new(Shared {
                config,
                store,
                runs: RunTracker::new(),
            }),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.shared.config
    }

    fn store(&self) -> &MockStore {
        &self.shared.store
    }

    pub fn resource<E: Creatable + Stored>(&self) -> Resources<E> {
        Resources {
            service: self.clone(),
            _entity: PhantomData,
        }
    }

    pub fn data_sources(&self) -> Resources<BackendDataSource> {
        self.resource()
    }

    pub fn dashboards(&self) -> Resources<Dashboard> {
        self.resource()
    }

    pub fn data_marts(&self) -> Resources<DataMart> {
        self.resource()
    }

    pub fn pipelines(&self) -> Resources<Pipeline> {
        self.resource()
    }

    pub fn users(&self) -> Resources<User> {
        self.resource()
    }

    pub fn schedulers(&self) -> Resources<Scheduler> {
        self.resource()
    }

    async fn simulate_latency(&self) {
        let latency = self.config().latency();
        if !latency.is_zero() {
            debug!("Simulating {:?} of network latency", latency);
            tokio::time::sleep(latency).await;
        }
    }

    async fn list_stored<E: Stored>(&self) -> MockResult<Vec<E>> {
        self.simulate_latency().await;
        if E::FLAKY_LIST && chance(self.config().failure_rate) {
            warn!("Injecting transient failure on {} list", E::KIND);
            return Err(MockError::Transient(E::KIND));
        }
        Ok(self.store().collection::<E>().list().await)
    }

    async fn get_stored<E: Stored>(&self, id: &str) -> MockResult<E> {
        self.simulate_latency().await;
        self.store().collection::<E>().get(id).await
    }

    pub async fn list_organizations(&self) -> MockResult<Vec<Organization>> {
        self.list_stored().await
    }

    pub async fn get_organization(&self, id: &str) -> MockResult<Organization> {
        self.get_stored(id).await
    }

    pub async fn list_roles(&self) -> MockResult<Vec<Role>> {
        self.list_stored().await
    }

    pub async fn get_role(&self, id: &str) -> MockResult<Role> {
        self.get_stored(id).await
    }

    /// Probe a registered data source; fails with `ConnectionFailed` at the configured rate
    pub async fn test_connection(&self, id: &str) -> MockResult<ConnectionTest> {
        let source: BackendDataSource = self.get_stored(id).await?;

        if chance(self.config().connection_failure_rate) {
            warn!("Simulated connection failure for data source {}", id);
            return Err(MockError::ConnectionFailed {
                id: id.to_string(),
                reason: "Connection timed out".to_string(),
            });
        }

        Ok(ConnectionTest {
            status: "success".to_string(),
            message: format!("Successfully connected to {}", source.name),
            response_time_ms: roll(CONNECTION_RESPONSE_MS),
        })
    }

    /// Canned result set for the query editor
    pub async fn execute_query(&self, data_source_id: &str, sql: &str) -> MockResult<QueryResult> {
        let _: BackendDataSource = self.get_stored(data_source_id).await?;
        debug!("Executing query on data source {}: {}", data_source_id, sql);

        let rows = vec![
            vec![json!(1), json!("North"), json!(12500.5)],
            vec![json!(2), json!("South"), json!(9800.0)],
            vec![json!(3), json!("West"), json!(15320.75)],
        ];
        Ok(QueryResult {
            columns: vec!["id".to_string(), "region".to_string(), "revenue".to_string()],
            row_count: rows.len(),
            rows,
            execution_time_ms: roll(QUERY_EXECUTION_MS),
        })
    }

    pub async fn refresh_data_mart(&self, id: &str) -> MockResult<DataMart> {
        self.simulate_latency().await;
        let marts = self.store().collection::<DataMart>();
        if !marts.contains(id).await {
            return Err(MockError::not_found(ResourceKind::DataMart, id));
        }

        info!("Refreshing data mart {}", id);
        tokio::time::sleep(self.config().refresh_delay()).await;

        let row_count = roll(REFRESH_ROW_COUNT);
        let now = Utc::now();
        marts
            .modify(id, |mart| {
                mart.row_count = row_count;
                mart.last_refreshed = Some(now);
                mart.status = "active".to_string();
                mart.updated_at = now;
            })
            .await
    }

    /// Start a run in `running` state and complete it in the background.
    ///
    /// Use [`MockService::wait_for_run`] or [`MockService::watch_run`] to
    /// observe completion, or poll [`MockService::get_pipeline_runs`].
    pub async fn trigger_pipeline(&self, id: &str) -> MockResult<PipelineRun> {
        self.simulate_latency().await;

        let now = Utc::now();
        self.store()
            .collection::<Pipeline>()
            .modify(id, |pipeline| {
                pipeline.last_run = Some(now);
                pipeline.updated_at = now;
            })
            .await?;

        let run = self
            .store()
            .collection::<PipelineRun>()
            .insert_with(|run_id| PipelineRun::started(run_id, id, now))
            .await;
        self.shared.runs.register(&run.id).await;
        info!("Pipeline {} triggered, run {} running", id, run.id);

        let service = self.clone();
        let run_id = run.id.clone();
        tokio::spawn(async move {
            service.complete_run(&run_id).await;
        });

        Ok(run)
    }

    async fn complete_run(&self, run_id: &str) {
        tokio::time::sleep(self.config().pipeline_completion_delay()).await;

        let records = roll(RUN_RECORD_COUNT);
        let now = Utc::now();
        let result = self
            .store()
            .collection::<PipelineRun>()
            .modify(run_id, |run| {
                run.status = RunStatus::Success;
                run.completed_at = Some(now);
                run.records_processed = records;
            })
            .await;

        match result {
            Ok(run) => info!(
                "Run {} of pipeline {} finished: {} records",
                run.id, run.pipeline_id, run.records_processed
            ),
            Err(err) => warn!("Could not complete run {}: {}", run_id, err),
        }
        self.shared.runs.publish(run_id, RunStatus::Success).await;
    }

    /// Runs of one pipeline, oldest first
    pub async fn get_pipeline_runs(&self, pipeline_id: &str) -> MockResult<Vec<PipelineRun>> {
        let _: Pipeline = self.get_stored(pipeline_id).await?;
        Ok(self
            .store()
            .collection::<PipelineRun>()
            .filter(|run| run.pipeline_id == pipeline_id)
            .await)
    }

    pub async fn get_pipeline_run(&self, run_id: &str) -> MockResult<PipelineRun> {
        self.get_stored(run_id).await
    }

    /// Status updates for a run; finished runs yield a receiver holding the final status
    pub async fn watch_run(&self, run_id: &str) -> MockResult<watch::Receiver<RunStatus>> {
        self.simulate_latency().await;
        if let Some(receiver) = self.shared.runs.subscribe(run_id).await {
            return Ok(receiver);
        }
        let run = self.get_pipeline_run(run_id).await?;
        let (_, receiver) = watch::channel(run.status);
        Ok(receiver)
    }

    /// Resolve once the run has reached a terminal state
    pub async fn wait_for_run(&self, run_id: &str) -> MockResult<PipelineRun> {
        let mut receiver = self.watch_run(run_id).await?;
        loop {
            let status = *receiver.borrow_and_update();
            if status.is_terminal() || receiver.changed().await.is_err() {
                break;
            }
        }
        self.get_pipeline_run(run_id).await
    }

    pub async fn toggle_pipeline(&self, id: &str) -> MockResult<Pipeline> {
        self.simulate_latency().await;
        let now = Utc::now();
        self.store()
            .collection::<Pipeline>()
            .modify(id, |pipeline| {
                pipeline.status = pipeline.status.toggled();
                pipeline.updated_at = now;
            })
            .await
    }

    pub async fn toggle_scheduler(&self, id: &str) -> MockResult<Scheduler> {
        self.simulate_latency().await;
        let now = Utc::now();
        self.store()
            .collection::<Scheduler>()
            .modify(id, |scheduler| {
                scheduler.enabled = !scheduler.enabled;
                scheduler.updated_at = now;
            })
            .await
    }

    pub async fn overview_stats(&self) -> MockResult<OverviewStats> {
        self.simulate_latency().await;
        let store = self.store();
        let active_pipelines = store
            .collection::<Pipeline>()
            .filter(|pipeline| pipeline.status == PipelineStatus::Active)
            .await
            .len();

        Ok(OverviewStats {
            data_sources: store.collection::<BackendDataSource>().len().await,
            dashboards: store.collection::<Dashboard>().len().await,
            data_marts: store.collection::<DataMart>().len().await,
            pipelines: store.collection::<Pipeline>().len().await,
            active_pipelines,
            users: store.collection::<User>().len().await,
        })
    }
}

/// Typed handle onto one resource collection of a [`MockService`]
pub struct Resources<E> {
    service: MockService,
    _entity: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E> ResourceApi for Resources<E>
where
    E: Creatable + Stored,
{
    type Entity = E;

    async fn list(&self) -> MockResult<Vec<E>> {
        self.service.list_stored().await
    }

    async fn get(&self, id: &str) -> MockResult<E> {
        self.service.get_stored(id).await
    }

    async fn create(&self, draft: E::Draft) -> MockResult<E> {
        self.service.simulate_latency().await;
        let now = Utc::now();
        let created = self
            .service
            .store()
            .collection::<E>()
            .insert_with(|id| E::build(draft, id, now))
            .await;
        info!("Created {} {}", E::KIND, created.id());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: Value) -> MockResult<E> {
        self.service.simulate_latency().await;
        let updated = self.service.store().collection::<E>().update(id, &patch).await?;
        debug!("Updated {} {}", E::KIND, id);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> MockResult<Deleted> {
        self.service.simulate_latency().await;
        let removed = self.service.store().collection::<E>().remove(id).await?;
        info!("Deleted {} {}", E::KIND, removed.id());
        Ok(Deleted {
            id: removed.id().to_string(),
            message: format!("{} deleted successfully", E::KIND),
        })
    }
}

fn chance(probability: f64) -> bool {
    probability > 0.0 && rand::thread_rng().gen_bool(probability.min(1.0))
}

fn roll(range: RangeInclusive<u64>) -> u64 {
    rand::thread_rng().gen_range(range)
}
