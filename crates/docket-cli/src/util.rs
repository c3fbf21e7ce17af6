use anyhow::{anyhow, Result};
use docket_core::error::CoreError;
use docket_core::models::User;
use docket_core::repository::Repository;
use uuid::Uuid;

const MIN_SHORT_ID_LEN: usize = 2;

fn check_short_id(short_id: &str) -> Result<()> {
    if short_id.trim().len() < MIN_SHORT_ID_LEN {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    Ok(())
}

fn pick_one(short_id: &str, kind: &str, matches: Vec<(Uuid, String)>) -> Result<Uuid> {
    match matches.len() {
        1 => Ok(matches[0].0),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No {} found with ID prefix '{}'",
            kind, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|(id, name)| (id.to_string(), name))
                .collect()
        ))),
    }
}

pub async fn resolve_instance_id(repo: &impl Repository, owner: Uuid, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let instances = repo.find_instances_by_short_id_prefix(owner, short_id).await?;
    pick_one(
        short_id,
        "task",
        instances.into_iter().map(|i| (i.id, i.name)).collect(),
    )
}

pub async fn resolve_template_id(repo: &impl Repository, owner: Uuid, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let templates = repo.find_templates_by_short_id_prefix(owner, short_id).await?;
    pick_one(
        short_id,
        "template",
        templates.into_iter().map(|t| (t.id, t.name)).collect(),
    )
}

/// Looks up the acting user by name.
pub async fn resolve_user(repo: &impl Repository, username: Option<&str>) -> Result<User> {
    let username = username.ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(
            "No user selected. Pass --user <name> or set `user` in docket.toml".to_string()
        ))
    })?;

    repo.find_user_by_name(username).await?.ok_or_else(|| {
        anyhow!(CoreError::NotFound(format!(
            "Unknown user '{}'. Register with `docket register {}`",
            username, username
        )))
    })
}
