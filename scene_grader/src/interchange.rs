//! Assignment definitions as JSON, for moving them between databases or editing them by hand.
//!
//! Export writes every assignment with its directories. Import updates rows whose `id` exists and
//! creates the others, all in one transaction.

use chrono::NaiveDateTime;
use log::{debug, info};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, io::Write, path::Path};
use tempfile::NamedTempFile;

use crate::admin::{NewAssetDirectory, NewAssignment};
use crate::config::Config;
use crate::error::Result;
use crate::input;
use crate::store::{asset_directory, assignment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDirectoryJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub path: String,
    #[serde(default)]
    pub extra_credit: bool,
    pub graded: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub theme: i32,
    pub milestone: i32,
    pub deliverable: i32,
    pub oracle_path: String,
    pub template_path: String,
    #[serde(deserialize_with = "iso_date")]
    pub start_date: NaiveDateTime,
    #[serde(deserialize_with = "iso_date")]
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub asset_directories: Vec<AssetDirectoryJson>,
}

/// Dates are written as full date-times but a plain `YYYY-MM-DD` is read back as midnight.
fn iso_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDateTime, D::Error> {
    let s = String::deserialize(d)?;
    input::parse_date(&s).map_err(serde::de::Error::custom)
}

impl AssignmentJson {
    fn from_model(a: assignment::Model, dirs: Vec<asset_directory::Model>) -> Self {
        Self {
            id: Some(a.id),
            theme: a.theme,
            milestone: a.milestone,
            deliverable: a.deliverable,
            oracle_path: a.oracle_path,
            template_path: a.template_path,
            start_date: a.start_date,
            due_date: a.due_date,
            asset_directories: dirs
                .into_iter()
                .map(|d| AssetDirectoryJson {
                    id: Some(d.id),
                    path: d.path,
                    extra_credit: d.extra_credit,
                    graded: d.graded,
                    hidden: d.hidden,
                })
                .collect(),
        }
    }

    fn validate(&self, config: &Config) -> Result<()> {
        NewAssignment {
            theme: self.theme,
            milestone: self.milestone,
            deliverable: self.deliverable,
            oracle_path: self.oracle_path.clone(),
            template_path: self.template_path.clone(),
            start_date: self.start_date,
            due_date: self.due_date,
            directories: self
                .asset_directories
                .iter()
                .map(|d| NewAssetDirectory {
                    path: d.path.clone(),
                    extra_credit: d.extra_credit,
                    graded: d.graded,
                    hidden: d.hidden,
                })
                .collect(),
        }
        .validate(config)
    }
}

pub async fn export_assignments<C: ConnectionTrait>(db: &C, path: &Path) -> Result<usize> {
    let mut all = vec![];
    for a in assignment::all(db).await? {
        let dirs = a.directories(db).await?;
        all.push(AssignmentJson::from_model(a, dirs));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(serde_json::to_string_pretty(&all)?.as_bytes())?;
    file.write_all(b"\n")?;
    file.persist(path).map_err(|e| e.error)?;

    info!("exported {} assignment(s) to '{}'", all.len(), path.display());
    Ok(all.len())
}

async fn upsert_directory<C: ConnectionTrait>(
    db: &C,
    assignment_id: i32,
    json: AssetDirectoryJson,
) -> Result<asset_directory::Model> {
    let existing = match json.id {
        Some(id) => asset_directory::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let updating = existing.is_some();
    let mut active = match existing {
        Some(found) => found.into(),
        None => asset_directory::ActiveModel {
            id: json.id.map_or(NotSet, Set),
            ..Default::default()
        },
    };
    active.assignment_id = Set(assignment_id);
    active.path = Set(json.path);
    active.extra_credit = Set(json.extra_credit);
    active.graded = Set(json.graded);
    active.hidden = Set(json.hidden);

    let model = if updating {
        active.update(db).await?
    } else {
        active.insert(db).await?
    };
    Ok(model)
}

async fn upsert_assignment<C: ConnectionTrait>(
    db: &C,
    json: AssignmentJson,
) -> Result<assignment::Model> {
    let existing = match json.id {
        Some(id) => assignment::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let updating = existing.is_some();
    let mut active = match existing {
        Some(found) => found.into(),
        None => assignment::ActiveModel {
            id: json.id.map_or(NotSet, Set),
            ..Default::default()
        },
    };
    active.theme = Set(json.theme);
    active.milestone = Set(json.milestone);
    active.deliverable = Set(json.deliverable);
    active.oracle_path = Set(json.oracle_path);
    active.template_path = Set(json.template_path);
    active.start_date = Set(json.start_date);
    active.due_date = Set(json.due_date);

    let model = if updating {
        active.update(db).await?
    } else {
        active.insert(db).await?
    };
    debug!("{} {model}", if updating { "updated" } else { "created" });

    for dir in json.asset_directories {
        upsert_directory(db, model.id, dir).await?;
    }
    Ok(model)
}

/// Loads `path` into the store. Either every assignment in the file is applied or none is.
pub async fn import_assignments<C>(
    db: &C,
    config: &Config,
    path: &Path,
) -> Result<Vec<assignment::Model>>
where
    C: ConnectionTrait + TransactionTrait,
{
    let text = fs::read_to_string(path)?;
    let parsed: Vec<AssignmentJson> = serde_json::from_str(&text)?;
    for a in &parsed {
        a.validate(config)?;
    }

    let txn = db.begin().await?;
    let mut imported = Vec::with_capacity(parsed.len());
    for a in parsed {
        imported.push(upsert_assignment(&txn, a).await?);
    }
    txn.commit().await?;

    info!("imported {} assignment(s) from '{}'", imported.len(), path.display());
    Ok(imported)
}
