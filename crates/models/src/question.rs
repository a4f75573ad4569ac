use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{module, user};

/// A stored question row. `user_id` is the owner and never changes after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub module_id: i32,
    pub title: String,
    pub tags: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, Module }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Module => Entity::belongs_to(module::Entity)
                .from(Column::ModuleId)
                .to(module::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<module::Entity> for Entity {
    fn to() -> RelationDef { Relation::Module.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for an insert or a full replacement; the id is assigned by the
/// database on insert and supplied separately on update.
#[derive(Clone, Debug, PartialEq)]
pub struct NewQuestion {
    pub user_id: i32,
    pub module_id: i32,
    pub title: String,
    pub tags: String,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl NewQuestion {
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            user_id: Set(self.user_id),
            module_id: Set(self.module_id),
            title: Set(self.title),
            tags: Set(self.tags),
            description: Set(self.description),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }

    /// Materialize the row as it would read back under `id`.
    pub fn with_id(self, id: i32) -> Model {
        Model {
            id,
            user_id: self.user_id,
            module_id: self.module_id,
            title: self.title,
            tags: self.tags,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
