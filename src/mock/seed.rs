//! Fixed demo data loaded into a fresh mock session

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::mock::entities::{
    BackendDataSource, Dashboard, DataMart, Organization, Pipeline, PipelineRun, PipelineStatus,
    Role, RunStatus, Scheduler, User,
};

fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

pub fn data_sources(now: DateTime<Utc>) -> Vec<BackendDataSource> {
    let source = |id: &str, name: &str, kind: &str, host: &str, port: u16, database: &str, age: i64| {
        BackendDataSource {
            id: id.to_string(),
            name: name.to_string(),
            connection_type: kind.to_string(),
            host: host.to_string(),
            port,
            database: database.to_string(),
            username: "datamantri".to_string(),
            status: "connected".to_string(),
            created_at: days_ago(now, age),
            updated_at: days_ago(now, age / 2),
        }
    };

    vec![
        source("1", "Production PostgreSQL", "postgresql", "prod-db.internal", 5432, "sales", 120),
        source("2", "Analytics MySQL", "mysql", "analytics.internal", 3306, "events", 90),
        source("3", "Marketing MongoDB", "mongodb", "mongo.internal", 27017, "campaigns", 45),
    ]
}

pub fn dashboards(now: DateTime<Utc>) -> Vec<Dashboard> {
    vec![
        Dashboard {
            id: "1".to_string(),
            name: "Sales Overview".to_string(),
            description: Some("Monthly revenue and order volume".to_string()),
            widgets: vec![
                json!({ "type": "line", "title": "Revenue", "data_source_id": "1" }),
                json!({ "type": "bar", "title": "Orders by region", "data_source_id": "1" }),
            ],
            is_public: true,
            created_by: "admin".to_string(),
            created_at: days_ago(now, 60),
            updated_at: days_ago(now, 2),
        },
        Dashboard {
            id: "2".to_string(),
            name: "Marketing Funnel".to_string(),
            description: Some("Campaign conversion by stage".to_string()),
            widgets: vec![json!({ "type": "funnel", "title": "Conversion", "data_source_id": "3" })],
            is_public: false,
            created_by: "analyst".to_string(),
            created_at: days_ago(now, 30),
            updated_at: days_ago(now, 5),
        },
    ]
}

pub fn data_marts(now: DateTime<Utc>) -> Vec<DataMart> {
    vec![
        DataMart {
            id: "1".to_string(),
            name: "Customer 360".to_string(),
            description: Some("Joined customer profile and order history".to_string()),
            data_source_id: "1".to_string(),
            query: "SELECT c.*, o.total FROM customers c JOIN orders o ON o.customer_id = c.id"
                .to_string(),
            row_count: 48_213,
            status: "active".to_string(),
            last_refreshed: Some(days_ago(now, 1)),
            created_at: days_ago(now, 40),
            updated_at: days_ago(now, 1),
        },
        DataMart {
            id: "2".to_string(),
            name: "Daily Events".to_string(),
            description: None,
            data_source_id: "2".to_string(),
            query: "SELECT date(ts) AS day, count(*) FROM events GROUP BY 1".to_string(),
            row_count: 365,
            status: "active".to_string(),
            last_refreshed: Some(days_ago(now, 3)),
            created_at: days_ago(now, 20),
            updated_at: days_ago(now, 3),
        },
    ]
}

pub fn pipelines(now: DateTime<Utc>) -> Vec<Pipeline> {
    vec![
        Pipeline {
            id: "1".to_string(),
            name: "Orders to Warehouse".to_string(),
            description: Some("Nightly copy of new orders".to_string()),
            source_id: "1".to_string(),
            destination_id: "2".to_string(),
            schedule: Some("0 2 * * *".to_string()),
            status: PipelineStatus::Active,
            last_run: Some(days_ago(now, 1)),
            created_at: days_ago(now, 90),
            updated_at: days_ago(now, 1),
        },
        Pipeline {
            id: "2".to_string(),
            name: "Campaign Sync".to_string(),
            description: None,
            source_id: "3".to_string(),
            destination_id: "2".to_string(),
            schedule: None,
            status: PipelineStatus::Paused,
            last_run: Some(days_ago(now, 7)),
            created_at: days_ago(now, 50),
            updated_at: days_ago(now, 7),
        },
    ]
}

pub fn pipeline_runs(now: DateTime<Utc>) -> Vec<PipelineRun> {
    vec![
        PipelineRun {
            id: "1".to_string(),
            pipeline_id: "1".to_string(),
            status: RunStatus::Success,
            started_at: days_ago(now, 1),
            completed_at: Some(days_ago(now, 1) + Duration::minutes(4)),
            records_processed: 12_480,
            error_message: None,
        },
        PipelineRun {
            id: "2".to_string(),
            pipeline_id: "2".to_string(),
            status: RunStatus::Failed,
            started_at: days_ago(now, 7),
            completed_at: Some(days_ago(now, 7) + Duration::minutes(1)),
            records_processed: 0,
            error_message: Some("Authentication failed for source".to_string()),
        },
    ]
}

pub fn users(now: DateTime<Utc>) -> Vec<User> {
    let user = |id: &str, name: &str, email: &str, role: &str, active: bool| User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        organization_id: Some("1".to_string()),
        is_active: active,
        created_at: days_ago(now, 100),
        updated_at: days_ago(now, 10),
    };

    vec![
        user("1", "Admin User", "admin@datamantri.io", "admin", true),
        user("2", "Data Analyst", "analyst@datamantri.io", "analyst", true),
        user("3", "Viewer", "viewer@datamantri.io", "viewer", false),
    ]
}

pub fn organizations(now: DateTime<Utc>) -> Vec<Organization> {
    vec![Organization {
        id: "1".to_string(),
        name: "DataMantri Demo".to_string(),
        plan: "enterprise".to_string(),
        created_at: days_ago(now, 365),
    }]
}

pub fn roles() -> Vec<Role> {
    let role = |id: &str, name: &str, permissions: &[&str]| Role {
        id: id.to_string(),
        name: name.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        role("1", "admin", &["read", "write", "delete", "manage_users"]),
        role("2", "analyst", &["read", "write"]),
        role("3", "viewer", &["read"]),
    ]
}

pub fn schedulers(now: DateTime<Utc>) -> Vec<Scheduler> {
    vec![Scheduler {
        id: "1".to_string(),
        name: "Nightly orders".to_string(),
        pipeline_id: "1".to_string(),
        cron_expression: "0 2 * * *".to_string(),
        enabled: true,
        next_run: Some(now + Duration::hours(8)),
        created_at: days_ago(now, 90),
        updated_at: days_ago(now, 90),
    }]
}
