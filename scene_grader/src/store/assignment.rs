use chrono::{Duration, NaiveDateTime};
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;

use super::asset_directory;

/// One gradable unit: deliverable `deliverable` of milestone `milestone` of theme `theme`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub theme: i32,
    pub milestone: i32,
    pub deliverable: i32,
    /// Reference binary that judges a submission's output.
    pub oracle_path: String,
    /// Starter code copied underneath every submission.
    pub template_path: String,
    pub start_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset_directory::Entity")]
    AssetDirectories,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
}

impl Related<super::asset_directory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetDirectories.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Short name students type to pick the assignment, e.g. `t2m1d3`.
    pub fn name(&self) -> String {
        format!("t{}m{}d{}", self.theme, self.milestone, self.deliverable)
    }

    pub fn is_creative(&self, creative_deliverable: i32) -> bool {
        self.deliverable == creative_deliverable
    }

    pub async fn directories<C>(&self, db: &C) -> Result<Vec<asset_directory::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(asset_directory::Entity)
            .order_by_asc(asset_directory::Column::Id)
            .all(db)
            .await
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Assignment {} open {} due {}>",
            self.name(),
            self.start_date,
            self.due_date
        )
    }
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Id).all(db).await
}

/// Assignments that have started and whose due date plus `late_window` is not yet past.
///
/// `due_date + late_window >= now` is evaluated as `due_date >= now - late_window`.
pub async fn current_assignments<C>(
    db: &C,
    now: NaiveDateTime,
    late_window: Duration,
) -> Result<Vec<Model>, DbErr>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(Column::DueDate.gte(now - late_window))
        .filter(Column::StartDate.lte(now))
        .order_by_asc(Column::Id)
        .all(db)
        .await
}
