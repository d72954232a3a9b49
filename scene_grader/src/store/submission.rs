use chrono::{DateTime, Utc};
use log::info;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set, TransactionTrait};

use super::test_run::{self, NewTestRun};
use crate::grader::score::Score;

/// A single confirmed grading attempt of one student on one assignment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub difficulty_rating: Option<i32>,
    pub fun_rating: Option<i32>,
    pub frustration_rating: Option<i32>,
    pub days_spent_on: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    pub submission_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::test_run::Entity")]
    TestRuns,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::test_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Answers to the optional end-of-assignment questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Survey {
    pub difficulty_rating: Option<i32>,
    pub fun_rating: Option<i32>,
    pub frustration_rating: Option<i32>,
    pub days_spent_on: Option<i32>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub assignment_id: i32,
    pub student_id: i32,
    pub survey: Survey,
    pub submission_time: DateTime<Utc>,
}

impl Model {
    /// Runs in the order they were recorded.
    pub async fn runs<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<test_run::Model>, DbErr> {
        self.find_related(test_run::Entity)
            .order_by_asc(test_run::Column::Id)
            .all(db)
            .await
    }

    pub async fn score<C: ConnectionTrait>(&self, db: &C) -> Result<Score, DbErr> {
        Ok(Score::from_verdicts(
            self.runs(db).await?.iter().map(|r| r.verdict),
        ))
    }
}

/// Most recent submission of `student_id` on `assignment_id`.
pub async fn latest_for<C>(
    db: &C,
    student_id: i32,
    assignment_id: i32,
) -> Result<Option<Model>, DbErr>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::AssignmentId.eq(assignment_id))
        .order_by_desc(Column::SubmissionTime)
        .order_by_desc(Column::Id)
        .one(db)
        .await
}

/// Writes the submission and all of its runs in one transaction.
pub async fn commit<C>(db: &C, new: NewSubmission, runs: &[NewTestRun]) -> Result<Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let submission = ActiveModel {
        assignment_id: Set(new.assignment_id),
        student_id: Set(new.student_id),
        difficulty_rating: Set(new.survey.difficulty_rating),
        fun_rating: Set(new.survey.fun_rating),
        frustration_rating: Set(new.survey.frustration_rating),
        days_spent_on: Set(new.survey.days_spent_on),
        comments: Set(new.survey.comments),
        submission_time: Set(new.submission_time),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for run in runs {
        test_run::ActiveModel {
            submission_id: Set(submission.id),
            scene_path: Set(run.scene_path.clone()),
            verdict: Set(run.verdict),
            run_time: Set(run.run_time),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(
        "committed submission {} with {} run(s)",
        submission.id,
        runs.len()
    );
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{assignment, connect_in_memory, student, test_run::Verdict};
    use chrono::{NaiveDate, TimeZone, Timelike};
    use sea_orm::DatabaseConnection;

    async fn fixture(db: &DatabaseConnection) -> (student::Model, assignment::Model) {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let a = assignment::ActiveModel {
            theme: Set(1),
            milestone: Set(1),
            deliverable: Set(1),
            oracle_path: Set("/oracle".to_string()),
            template_path: Set("/template".to_string()),
            start_date: Set(day),
            due_date: Set(day),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        (student::create(db, "abc123").await.unwrap(), a)
    }

    fn run(path: &str, verdict: Verdict) -> NewTestRun {
        NewTestRun {
            scene_path: path.to_string(),
            verdict,
            run_time: Utc::now(),
        }
    }

    fn new_submission(s: &student::Model, a: &assignment::Model, hour: u32) -> NewSubmission {
        NewSubmission {
            assignment_id: a.id,
            student_id: s.id,
            survey: Survey::default(),
            submission_time: Utc.with_ymd_and_hms(2024, 1, 2, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn should_commit_submission_with_runs() {
        let db = connect_in_memory().await.unwrap();
        let (s, a) = fixture(&db).await;

        let committed = commit(
            &db,
            new_submission(&s, &a, 1),
            &[
                run("a.xml", Verdict::Pass),
                run("b.xml", Verdict::Fail),
                run("c.xml", Verdict::Indeterminate),
            ],
        )
        .await
        .unwrap();

        let runs = committed.runs(&db).await.unwrap();
        let paths: Vec<_> = runs.iter().map(|r| r.scene_path.as_str()).collect();
        assert_eq!(paths, ["a.xml", "b.xml", "c.xml"]);
        assert!(runs.iter().all(|r| r.submission_id == committed.id));

        let score = committed.score(&db).await.unwrap();
        assert_eq!(score.passed(), 1);
        assert_eq!(score.attempted(), 2);
    }

    #[tokio::test]
    async fn should_store_nothing_when_a_run_cannot_be_written() {
        let db = connect_in_memory().await.unwrap();
        let (s, a) = fixture(&db).await;
        db.execute_unprepared("DROP TABLE test_scene_runs")
            .await
            .unwrap();

        let result = commit(
            &db,
            new_submission(&s, &a, 1),
            &[run("a.xml", Verdict::Pass)],
        )
        .await;

        assert!(result.is_err());
        assert!(Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_pick_most_recent_submission() {
        let db = connect_in_memory().await.unwrap();
        let (s, a) = fixture(&db).await;
        assert!(latest_for(&db, s.id, a.id).await.unwrap().is_none());

        commit(&db, new_submission(&s, &a, 5), &[run("a.xml", Verdict::Pass)])
            .await
            .unwrap();
        commit(&db, new_submission(&s, &a, 3), &[run("a.xml", Verdict::Fail)])
            .await
            .unwrap();

        let latest = latest_for(&db, s.id, a.id).await.unwrap().unwrap();
        assert_eq!(latest.submission_time.hour(), 5);
        assert_eq!(s.grade_on(&db, a.id).await.unwrap(), Some(1.0));
    }
}
