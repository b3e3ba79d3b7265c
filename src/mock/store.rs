use chrono::Utc;

use crate::mock::collection::Collection;
use crate::mock::entities::{
    BackendDataSource, Dashboard, DataMart, Organization, Pipeline, PipelineRun, Resource, Role,
    Scheduler, User,
};
use crate::mock::seed;

/// Every collection of one mock session
#[derive(Default)]
pub struct MockStore {
    data_sources: Collection<BackendDataSource>,
    dashboards: Collection<Dashboard>,
    data_marts: Collection<DataMart>,
    pipelines: Collection<Pipeline>,
    pipeline_runs: Collection<PipelineRun>,
    users: Collection<User>,
    organizations: Collection<Organization>,
    roles: Collection<Role>,
    schedulers: Collection<Scheduler>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let now = Utc::now();
        Self {
            data_sources: Collection::with_items(seed::data_sources(now)),
            dashboards: Collection::with_items(seed::dashboards(now)),
            data_marts: Collection::with_items(seed::data_marts(now)),
            pipelines: Collection::with_items(seed::pipelines(now)),
            pipeline_runs: Collection::with_items(seed::pipeline_runs(now)),
            users: Collection::with_items(seed::users(now)),
            organizations: Collection::with_items(seed::organizations(now)),
            roles: Collection::with_items(seed::roles()),
            schedulers: Collection::with_items(seed::schedulers(now)),
        }
    }

    pub fn collection<E: Stored>(&self) -> &Collection<E> {
        E::collection(self)
    }
}

/// Maps a resource type to its collection in the store
pub trait Stored: Resource {
    /// Whether `list` takes part in random failure injection
    const FLAKY_LIST: bool = false;

    fn collection(store: &MockStore) -> &Collection<Self>;
}

impl Stored for BackendDataSource {
    const FLAKY_LIST: bool = true;

    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.data_sources
    }
}

impl Stored for Dashboard {
    const FLAKY_LIST: bool = true;

    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.dashboards
    }
}

impl Stored for DataMart {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.data_marts
    }
}

impl Stored for Pipeline {
    const FLAKY_LIST: bool = true;

    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.pipelines
    }
}

impl Stored for PipelineRun {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.pipeline_runs
    }
}

impl Stored for User {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.users
    }
}

impl Stored for Organization {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.organizations
    }
}

impl Stored for Role {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.roles
    }
}

impl Stored for Scheduler {
    fn collection(store: &MockStore) -> &Collection<Self> {
        &store.schedulers
    }
}
