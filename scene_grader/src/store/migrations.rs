use sea_orm_migration::prelude::*;

mod m20240101_000001_create_assignments;
mod m20240101_000002_create_asset_directories;
mod m20240101_000003_create_students;
mod m20240101_000004_create_submissions;
mod m20240101_000005_create_test_scene_runs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_assignments::Migration),
            Box::new(m20240101_000002_create_asset_directories::Migration),
            Box::new(m20240101_000003_create_students::Migration),
            Box::new(m20240101_000004_create_submissions::Migration),
            Box::new(m20240101_000005_create_test_scene_runs::Migration),
        ]
    }
}
