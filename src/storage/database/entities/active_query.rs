use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outstanding word query database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "active_queries")]
pub struct Model {
    /// Record ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Word being looked up
    pub word: String,

    /// Correlation ID inside the batch input file
    pub batch_request_custom_id: String,

    /// Owning batch job ID
    pub batch_request_id: String,

    /// Uploaded input file ID
    pub uploaded_file_id: String,

    /// Creation timestamp
    pub created_at: DateTimeWithTimeZone,

    /// Last status change
    pub updated_at: DateTimeWithTimeZone,

    /// Query status (snake_case)
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
