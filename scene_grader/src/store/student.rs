use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::submission;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// University id, e.g. `abc123`.
    #[sea_orm(unique)]
    pub uni: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Grade of the most recent submission on `assignment_id`.
    ///
    /// `None` if the student never submitted it, or if that submission attempted no scene.
    pub async fn grade_on<C>(&self, db: &C, assignment_id: i32) -> Result<Option<f64>, DbErr>
    where
        C: ConnectionTrait,
    {
        match submission::latest_for(db, self.id, assignment_id).await? {
            Some(latest) => Ok(latest.score(db).await?.grade()),
            None => Ok(None),
        }
    }
}

pub async fn find_by_uni<C: ConnectionTrait>(db: &C, uni: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Uni.eq(uni)).one(db).await
}

pub async fn create<C: ConnectionTrait>(db: &C, uni: &str) -> Result<Model, DbErr> {
    ActiveModel {
        uni: Set(uni.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// The student with `uni`, created when missing. The flag is `true` for a new student.
pub async fn find_or_create<C: ConnectionTrait>(
    db: &C,
    uni: &str,
) -> Result<(Model, bool), DbErr> {
    match find_by_uni(db, uni).await? {
        Some(found) => Ok((found, false)),
        None => Ok((create(db, uni).await?, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connect_in_memory;

    #[tokio::test]
    async fn should_find_created_student() {
        let db = connect_in_memory().await.unwrap();
        assert!(find_by_uni(&db, "abc123").await.unwrap().is_none());

        let created = create(&db, "abc123").await.unwrap();
        let found = find_by_uni(&db, "abc123").await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn should_create_only_once() {
        let db = connect_in_memory().await.unwrap();
        let (first, created) = find_or_create(&db, "abc123").await.unwrap();
        assert!(created);
        let (second, created) = find_or_create(&db, "abc123").await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_reject_duplicate_uni() {
        let db = connect_in_memory().await.unwrap();
        create(&db, "abc123").await.unwrap();
        assert!(create(&db, "abc123").await.is_err());
    }

    #[tokio::test]
    async fn should_have_no_grade_without_submission() {
        let db = connect_in_memory().await.unwrap();
        let student = create(&db, "abc123").await.unwrap();
        assert_eq!(student.grade_on(&db, 42).await.unwrap(), None);
    }
}
