use std::collections::BTreeMap;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::activities_repo;
use crate::error::AppError;
use crate::models::Activity;

pub async fn list_activities(pool: &SqlitePool) -> Result<BTreeMap<String, Activity>, AppError> {
    let rows = activities_repo::list_activities(pool).await?;
    let mut rosters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for p in activities_repo::list_participants(pool).await? {
        rosters.entry(p.activity_name).or_default().push(p.email);
    }

    let mut activities = BTreeMap::new();
    for row in rows {
        let participants = rosters.remove(&row.name).unwrap_or_default();
        let activity = Activity::from_rows(row, participants)?;
        activities.insert(activity.name.clone(), activity);
    }
    Ok(activities)
}

pub async fn load_activity(pool: &SqlitePool, name: &str) -> Result<Option<Activity>, AppError> {
    let Some(row) = activities_repo::load_activity(pool, name).await? else {
        return Ok(None);
    };
    let participants = activities_repo::load_participant_emails(pool, name).await?;
    Activity::from_rows(row, participants).map(Some)
}

async fn require_activity(pool: &SqlitePool, name: &str) -> Result<Activity, AppError> {
    load_activity(pool, name)
        .await?
        .ok_or_else(|| AppError::ActivityNotFound(name.to_string()))
}

fn check_signup(activity: &Activity, email: &str) -> Result<(), AppError> {
    if activity.is_participant(email) {
        return Err(AppError::AlreadySignedUp {
            email: email.to_string(),
            activity: activity.name.clone(),
        });
    }
    if activity.is_full() {
        return Err(AppError::ActivityFull {
            activity: activity.name.clone(),
            max: activity.max_participants,
        });
    }
    Ok(())
}

// One read-check-write pass plus one retry after a lost race.
const SIGNUP_ATTEMPTS: usize = 2;

pub async fn signup(pool: &SqlitePool, activity_name: &str, email: &str) -> Result<String, AppError> {
    let mut activity = require_activity(pool, activity_name).await?;
    for attempt in 1..=SIGNUP_ATTEMPTS {
        check_signup(&activity, email)?;

        let inserted =
            activities_repo::insert_participant_if_open(pool, activity_name, email).await?;
        if inserted > 0 {
            info!(activity = %activity_name, email = %email, "participant signed up");
            return Ok(format!("Successfully signed up {} for {}", email, activity_name));
        }

        // The roster changed between the read and the write.
        warn!(activity = %activity_name, attempt, "signup lost a race, re-reading roster");
        activity = require_activity(pool, activity_name).await?;
    }

    check_signup(&activity, email)?;
    Err(AppError::ActivityFull {
        activity: activity.name,
        max: activity.max_participants,
    })
}

pub async fn unregister(
    pool: &SqlitePool,
    activity_name: &str,
    email: &str,
) -> Result<String, AppError> {
    let not_registered = || AppError::NotRegistered {
        email: email.to_string(),
        activity: activity_name.to_string(),
    };

    let activity = require_activity(pool, activity_name).await?;
    if !activity.is_participant(email) {
        return Err(not_registered());
    }

    let removed = activities_repo::delete_participant(pool, activity_name, email).await?;
    if removed == 0 {
        return Err(not_registered());
    }

    info!(activity = %activity_name, email = %email, "participant unregistered");
    Ok(format!("Successfully removed {} from {}", email, activity_name))
}
