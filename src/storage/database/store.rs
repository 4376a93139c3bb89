//! SeaORM-backed record store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::entities::{self, active_query, completed_query};
use super::migration::Migrator;
use crate::config::DatabaseConfig;
use crate::core::batch::{
    ActiveScan, CompletedWordQueryRecord, QueryStatus, UndecodableRecord, WordQueryRecord,
};
use crate::core::traits::RecordStore;
use crate::utils::error::{ReconcileError, Result};

/// Record store on a SQL database (SQLite or PostgreSQL)
#[derive(Debug, Clone)]
pub struct SeaOrmRecordStore {
    db: DatabaseConnection,
}

impl SeaOrmRecordStore {
    /// Connect and bring the schema up to date
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt).await?;
        info!("Database connection established");

        let store = Self { db };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing connection without running migrations
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.db, None).await?;
        debug!("Database migrations applied");
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn parse_status(raw: &str) -> Result<QueryStatus> {
    raw.parse().map_err(ReconcileError::Storage)
}

impl TryFrom<active_query::Model> for WordQueryRecord {
    type Error = ReconcileError;

    fn try_from(model: active_query::Model) -> Result<Self> {
        Ok(Self {
            status: parse_status(&model.status)?,
            id: model.id,
            word: model.word,
            batch_request_custom_id: model.batch_request_custom_id,
            batch_request_id: model.batch_request_id,
            uploaded_file_id: model.uploaded_file_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

impl TryFrom<completed_query::Model> for CompletedWordQueryRecord {
    type Error = ReconcileError;

    fn try_from(model: completed_query::Model) -> Result<Self> {
        Ok(Self {
            status: parse_status(&model.status)?,
            id: model.id,
            word: model.word,
            batch_request_custom_id: model.batch_request_custom_id,
            batch_request_id: model.batch_request_id,
            uploaded_file_id: model.uploaded_file_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            completed_at: model.completed_at.with_timezone(&Utc),
        })
    }
}

fn active_model(record: &WordQueryRecord) -> active_query::ActiveModel {
    active_query::ActiveModel {
        id: Set(record.id.clone()),
        word: Set(record.word.clone()),
        batch_request_custom_id: Set(record.batch_request_custom_id.clone()),
        batch_request_id: Set(record.batch_request_id.clone()),
        uploaded_file_id: Set(record.uploaded_file_id.clone()),
        created_at: Set(record.created_at.into()),
        updated_at: Set(record.updated_at.into()),
        status: Set(record.status.as_str().to_string()),
    }
}

fn completed_model(record: &CompletedWordQueryRecord) -> completed_query::ActiveModel {
    completed_query::ActiveModel {
        id: Set(record.id.clone()),
        word: Set(record.word.clone()),
        batch_request_custom_id: Set(record.batch_request_custom_id.clone()),
        batch_request_id: Set(record.batch_request_id.clone()),
        uploaded_file_id: Set(record.uploaded_file_id.clone()),
        created_at: Set(record.created_at.into()),
        updated_at: Set(record.updated_at.into()),
        status: Set(record.status.as_str().to_string()),
        completed_at: Set(record.completed_at.into()),
    }
}

fn collect_records<M, R>(models: Vec<M>) -> Result<Vec<R>>
where
    R: TryFrom<M, Error = ReconcileError>,
{
    models.into_iter().map(R::try_from).collect()
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn scan_active(&self) -> Result<ActiveScan> {
        let models = entities::ActiveQuery::find().all(&self.db).await?;

        let mut scan = ActiveScan::default();
        for model in models {
            let id = model.id.clone();
            match WordQueryRecord::try_from(model) {
                Ok(record) => scan.records.push(record),
                Err(e) => {
                    warn!("Skipping undecodable active record {}: {}", id, e);
                    scan.undecodable.push(UndecodableRecord {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(scan)
    }

    async fn query_active_by_status(&self, status: QueryStatus) -> Result<Vec<WordQueryRecord>> {
        let models = entities::ActiveQuery::find()
            .filter(active_query::Column::Status.eq(status.as_str()))
            .all(&self.db)
            .await?;
        collect_records(models)
    }

    async fn put_active(&self, record: &WordQueryRecord) -> Result<()> {
        entities::ActiveQuery::insert(active_model(record))
            .on_conflict(
                OnConflict::column(active_query::Column::Id)
                    .update_columns([
                        active_query::Column::Word,
                        active_query::Column::BatchRequestCustomId,
                        active_query::Column::BatchRequestId,
                        active_query::Column::UploadedFileId,
                        active_query::Column::CreatedAt,
                        active_query::Column::UpdatedAt,
                        active_query::Column::Status,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn update_active(&self, record: &WordQueryRecord) -> Result<()> {
        debug!("Updating active record {} -> {}", record.id, record.status);
        match active_model(record).update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(ReconcileError::NotFound(format!(
                "active record {}",
                record.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_active(&self, id: &str) -> Result<()> {
        entities::ActiveQuery::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn put_completed(&self, record: &CompletedWordQueryRecord) -> Result<()> {
        entities::CompletedQuery::insert(completed_model(record))
            .on_conflict(
                OnConflict::column(completed_query::Column::Id)
                    .update_columns([
                        completed_query::Column::Word,
                        completed_query::Column::BatchRequestCustomId,
                        completed_query::Column::BatchRequestId,
                        completed_query::Column::UploadedFileId,
                        completed_query::Column::CreatedAt,
                        completed_query::Column::UpdatedAt,
                        completed_query::Column::Status,
                        completed_query::Column::CompletedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_completed(&self, id: &str) -> Result<Option<CompletedWordQueryRecord>> {
        entities::CompletedQuery::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(CompletedWordQueryRecord::try_from)
            .transpose()
    }

    async fn scan_completed(&self) -> Result<Vec<CompletedWordQueryRecord>> {
        let models = entities::CompletedQuery::find().all(&self.db).await?;
        collect_records(models)
    }
}
