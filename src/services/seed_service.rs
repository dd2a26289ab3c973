use std::collections::BTreeMap;
use std::path::Path;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::database::activities_repo::{self, NewActivity};
use crate::error::AppError;
use crate::models::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub existing: i64,
    pub cleared: u64,
    pub inserted: usize,
}

/// Inserts `seed` only when the store holds no activities.
pub async fn seed_if_empty(pool: &SqlitePool, seed: &[Activity]) -> Result<SeedReport, AppError> {
    let mut tx = pool.begin().await?;
    let existing = activities_repo::count_activities(&mut tx).await?;
    if existing > 0 {
        tx.rollback().await?;
        info!(existing, "activity store already populated, skipping seed");
        return Ok(SeedReport {
            existing,
            cleared: 0,
            inserted: 0,
        });
    }

    let inserted = insert_all(&mut tx, seed).await?;
    tx.commit().await?;
    info!(inserted, "seeded activity store");
    Ok(SeedReport {
        existing,
        cleared: 0,
        inserted,
    })
}

/// Wipes every activity and roster, then inserts `seed`, atomically.
pub async fn reset(pool: &SqlitePool, seed: &[Activity]) -> Result<SeedReport, AppError> {
    let mut tx = pool.begin().await?;
    let existing = activities_repo::count_activities(&mut tx).await?;
    let cleared = activities_repo::clear_activities(&mut tx).await?;
    let inserted = insert_all(&mut tx, seed).await?;
    tx.commit().await?;
    info!(cleared, inserted, "reset activity store");
    Ok(SeedReport {
        existing,
        cleared,
        inserted,
    })
}

async fn insert_all(conn: &mut SqliteConnection, seed: &[Activity]) -> Result<usize, AppError> {
    for activity in seed {
        activity.validate()?;
        activities_repo::insert_activity(
            &mut *conn,
            NewActivity {
                name: &activity.name,
                description: &activity.description,
                schedule: &activity.schedule,
                max_participants: activity.max_participants,
            },
        )
        .await?;
        for email in &activity.participants {
            activities_repo::insert_participant(&mut *conn, &activity.name, email).await?;
        }
    }
    Ok(seed.len())
}

/// Parses a JSON object of activity name to activity record, the same shape
/// `GET /activities` answers with.
pub fn parse_seed(json: &str) -> Result<Vec<Activity>, AppError> {
    let by_name: BTreeMap<String, Activity> = serde_json::from_str(json)?;
    by_name
        .into_iter()
        .map(|(key, activity)| {
            if key != activity.name {
                return Err(AppError::InvalidRecord {
                    name: key,
                    reason: format!("keyed under a different name than '{}'", activity.name),
                });
            }
            activity.validate()?;
            Ok(activity)
        })
        .collect()
}

pub fn load_seed_file(path: &Path) -> Result<Vec<Activity>, AppError> {
    let json = std::fs::read_to_string(path).map_err(|source| AppError::SeedFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_seed(&json)
}

fn activity(
    name: &str,
    description: &str,
    schedule: &str,
    max_participants: u32,
    participants: &[&str],
) -> Activity {
    Activity {
        name: name.to_string(),
        description: description.to_string(),
        schedule: schedule.to_string(),
        max_participants,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

/// The Mergington High School activity catalogue.
pub fn default_seed() -> Vec<Activity> {
    vec![
        activity(
            "Chess Club",
            "Learn strategies and compete in chess tournaments",
            "Fridays, 3:30 PM - 5:00 PM",
            12,
            &["michael@mergington.edu", "daniel@mergington.edu"],
        ),
        activity(
            "Programming Class",
            "Learn programming fundamentals and build software projects",
            "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
            20,
            &["emma@mergington.edu", "sophia@mergington.edu"],
        ),
        activity(
            "Gym Class",
            "Physical education and sports activities",
            "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
            30,
            &["john@mergington.edu", "olivia@mergington.edu"],
        ),
        activity(
            "Soccer Team",
            "Join the school soccer team and compete in local leagues",
            "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
            18,
            &["lucas@mergington.edu", "mia@mergington.edu"],
        ),
        activity(
            "Basketball Club",
            "Practice basketball skills and play friendly matches",
            "Wednesdays, 3:30 PM - 5:00 PM",
            15,
            &["liam@mergington.edu", "ava@mergington.edu"],
        ),
        activity(
            "Art Club",
            "Explore painting, drawing, and other visual arts",
            "Mondays, 3:30 PM - 5:00 PM",
            16,
            &["ella@mergington.edu", "noah@mergington.edu"],
        ),
        activity(
            "Drama Society",
            "Participate in theater productions and acting workshops",
            "Fridays, 4:00 PM - 5:30 PM",
            20,
            &["amelia@mergington.edu", "jack@mergington.edu"],
        ),
        activity(
            "Math Olympiad",
            "Prepare for math competitions and solve challenging problems",
            "Thursdays, 3:30 PM - 5:00 PM",
            10,
            &["ethan@mergington.edu", "grace@mergington.edu"],
        ),
        activity(
            "Science Club",
            "Conduct experiments and explore scientific concepts",
            "Wednesdays, 4:00 PM - 5:00 PM",
            14,
            &["chloe@mergington.edu", "benjamin@mergington.edu"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    #[test]
    fn default_seed_is_valid() {
        let seed = default_seed();
        assert_eq!(seed.len(), 9);
        for activity in &seed {
            activity.validate().unwrap();
        }
    }

    #[test]
    fn parse_seed_rejects_over_capacity_rosters() {
        let json = r#"{
            "Tiny Club": {
                "name": "Tiny Club",
                "description": "Too small",
                "schedule": "Never",
                "max_participants": 1,
                "participants": ["a@x.edu", "b@x.edu"]
            }
        }"#;
        assert!(matches!(
            parse_seed(json),
            Err(AppError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn parse_seed_rejects_mismatched_keys_and_missing_fields() {
        let mismatched = r#"{
            "Chess": {
                "name": "Chess Club",
                "description": "d",
                "schedule": "s",
                "max_participants": 3,
                "participants": []
            }
        }"#;
        assert!(matches!(
            parse_seed(mismatched),
            Err(AppError::InvalidRecord { .. })
        ));

        let missing = r#"{ "Chess Club": { "name": "Chess Club" } }"#;
        assert!(matches!(parse_seed(missing), Err(AppError::SeedFormat(_))));
    }

    #[tokio::test]
    async fn seed_runs_once_and_reset_reseeds() {
        let pool = database::open("sqlite::memory:", 1).await.unwrap();
        let seed = default_seed();

        let first = seed_if_empty(&pool, &seed).await.unwrap();
        assert_eq!(first.inserted, 9);

        let second = seed_if_empty(&pool, &seed).await.unwrap();
        assert_eq!(second.existing, 9);
        assert_eq!(second.inserted, 0);

        let report = reset(&pool, &seed[..2]).await.unwrap();
        assert_eq!(report.cleared, 9);
        assert_eq!(report.inserted, 2);

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(activities_repo::count_activities(&mut conn).await.unwrap(), 2);
    }
}
