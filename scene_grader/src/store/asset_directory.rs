use sea_orm::entity::prelude::*;

use crate::discovery::{self, TestScene};

/// A directory of scene files attached to an assignment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_asset_directories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub assignment_id: i32,
    pub path: String,
    pub extra_credit: bool,
    /// Whether scenes in this directory count towards the deliverable.
    pub graded: bool,
    pub hidden: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Scenes currently present under `path`, tagged with this directory's flags.
    pub fn tests(&self, scene_extension: &str) -> Vec<TestScene> {
        discovery::scan(&self.path, scene_extension, self.graded, self.hidden)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<AssetDirectory '{}'{}{}{}>",
            self.path,
            if self.graded { " Graded" } else { " Ungraded" },
            if self.hidden { " Hidden" } else { "" },
            if self.extra_credit { " ExtraCredit" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_describe_flags() {
        let d = Model {
            id: 1,
            assignment_id: 1,
            path: "/assets/t1m1/Deliverable1/".to_string(),
            extra_credit: false,
            graded: false,
            hidden: true,
        };
        assert_eq!(
            d.to_string(),
            "<AssetDirectory '/assets/t1m1/Deliverable1/' Ungraded Hidden>"
        );
    }
}
