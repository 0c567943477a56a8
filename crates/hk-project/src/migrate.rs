//! Schema migration framework.

use crate::ProjectError;
use crate::schema::ProjectConfig;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: ProjectConfig) -> Result<ProjectConfig, ProjectError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: ProjectConfig) -> Result<ProjectConfig, ProjectError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

// Version 0 files predate the friction section; serde defaults fill it in.
fn migrate_v0_to_v1(mut config: ProjectConfig) -> Result<ProjectConfig, ProjectError> {
    config.version = 1;
    Ok(config)
}
