use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Outcome of one scene as recorded in the store.
///
/// `Indeterminate` covers every run that produced no verdict (crash, missing output, missing
/// oracle, unrecognized oracle output). It never counts towards a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "verdict_enum")]
pub enum Verdict {
    #[sea_orm(string_value = "pass")]
    Pass,
    #[sea_orm(string_value = "fail")]
    Fail,
    #[sea_orm(string_value = "indeterminate")]
    Indeterminate,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Indeterminate => "indeterminate",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_scene_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub submission_id: i32,
    pub scene_path: String,
    pub verdict: Verdict,
    pub run_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submission::Entity",
        from = "Column::SubmissionId",
        to = "super::submission::Column::Id"
    )]
    Submission,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A run waiting to be written together with its submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestRun {
    pub scene_path: String,
    pub verdict: Verdict,
    pub run_time: DateTime<Utc>,
}
