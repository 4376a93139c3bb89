use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Finished word query database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "completed_queries")]
pub struct Model {
    /// Record ID, shared with the active record it replaced
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub word: String,

    pub batch_request_custom_id: String,

    pub batch_request_id: String,

    pub uploaded_file_id: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Terminal query status (snake_case)
    pub status: String,

    /// When the batch was judged terminal
    pub completed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
