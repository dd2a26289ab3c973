use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{ActivitiesRow, ActivityParticipantsRow};

const SQL_COUNT_ACTIVITIES: &str = r#"
SELECT COUNT(*)
FROM activities
"#;

pub async fn count_activities(conn: &mut SqliteConnection) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_ACTIVITIES)
        .fetch_one(&mut *conn)
        .await
}

const SQL_LIST_ACTIVITIES: &str = r#"
SELECT
  name,
  description,
  schedule,
  max_participants
FROM activities
ORDER BY name ASC
"#;

pub async fn list_activities(pool: &SqlitePool) -> sqlx::Result<Vec<ActivitiesRow>> {
    sqlx::query_as::<_, ActivitiesRow>(SQL_LIST_ACTIVITIES)
        .fetch_all(pool)
        .await
}

const SQL_LIST_PARTICIPANTS: &str = r#"
SELECT
  activity_name,
  email
FROM activity_participants
ORDER BY activity_name ASC, id ASC
"#;

pub async fn list_participants(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityParticipantsRow>> {
    sqlx::query_as::<_, ActivityParticipantsRow>(SQL_LIST_PARTICIPANTS)
        .fetch_all(pool)
        .await
}

const SQL_LOAD_ACTIVITY: &str = r#"
SELECT
  name,
  description,
  schedule,
  max_participants
FROM activities
WHERE name = ?
"#;

pub async fn load_activity(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<ActivitiesRow>> {
    sqlx::query_as::<_, ActivitiesRow>(SQL_LOAD_ACTIVITY)
        .bind(name)
        .fetch_optional(pool)
        .await
}

const SQL_LOAD_PARTICIPANT_EMAILS: &str = r#"
SELECT email
FROM activity_participants
WHERE activity_name = ?
ORDER BY id ASC
"#;

pub async fn load_participant_emails(pool: &SqlitePool, name: &str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LOAD_PARTICIPANT_EMAILS)
        .bind(name)
        .fetch_all(pool)
        .await
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  name,
  description,
  schedule,
  max_participants
) VALUES (?, ?, ?, ?)
"#;

pub struct NewActivity<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub schedule: &'a str,
    pub max_participants: u32,
}

pub async fn insert_activity(
    conn: &mut SqliteConnection,
    activity: NewActivity<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.name)
        .bind(activity.description)
        .bind(activity.schedule)
        .bind(i64::from(activity.max_participants))
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

const SQL_INSERT_PARTICIPANT: &str = r#"
INSERT INTO activity_participants (activity_name, email)
VALUES (?, ?)
"#;

pub async fn insert_participant(
    conn: &mut SqliteConnection,
    activity_name: &str,
    email: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PARTICIPANT)
        .bind(activity_name)
        .bind(email)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

// Adds the email only while it is absent and the roster is below capacity,
// in one statement. Zero rows affected means one of the conditions failed.
const SQL_INSERT_PARTICIPANT_IF_OPEN: &str = r#"
INSERT INTO activity_participants (activity_name, email)
SELECT a.name, ?2
FROM activities a
WHERE a.name = ?1
  AND NOT EXISTS (
    SELECT 1
    FROM activity_participants p
    WHERE p.activity_name = a.name
      AND p.email = ?2
  )
  AND (
    SELECT COUNT(*)
    FROM activity_participants p
    WHERE p.activity_name = a.name
  ) < a.max_participants
"#;

pub async fn insert_participant_if_open(
    pool: &SqlitePool,
    activity_name: &str,
    email: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PARTICIPANT_IF_OPEN)
        .bind(activity_name)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_PARTICIPANT: &str = r#"
DELETE FROM activity_participants
WHERE activity_name = ?
  AND email = ?
"#;

pub async fn delete_participant(
    pool: &SqlitePool,
    activity_name: &str,
    email: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_PARTICIPANT)
        .bind(activity_name)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn clear_activities(conn: &mut SqliteConnection) -> sqlx::Result<u64> {
    sqlx::query("DELETE FROM activity_participants")
        .execute(&mut *conn)
        .await?;
    let res = sqlx::query("DELETE FROM activities")
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    async fn pool_with_activity(max_participants: u32) -> SqlitePool {
        let pool = database::open("sqlite::memory:", 1).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        insert_activity(
            &mut conn,
            NewActivity {
                name: "Art Club",
                description: "Painting",
                schedule: "Mondays",
                max_participants,
            },
        )
        .await
        .unwrap();
        drop(conn);
        pool
    }

    #[tokio::test]
    async fn conditional_insert_stops_at_capacity() {
        let pool = pool_with_activity(2).await;

        assert_eq!(insert_participant_if_open(&pool, "Art Club", "a@x.edu").await.unwrap(), 1);
        assert_eq!(insert_participant_if_open(&pool, "Art Club", "b@x.edu").await.unwrap(), 1);
        assert_eq!(insert_participant_if_open(&pool, "Art Club", "c@x.edu").await.unwrap(), 0);

        let emails = load_participant_emails(&pool, "Art Club").await.unwrap();
        assert_eq!(emails, vec!["a@x.edu", "b@x.edu"]);
    }

    #[tokio::test]
    async fn conditional_insert_skips_duplicates_and_unknown_activities() {
        let pool = pool_with_activity(5).await;

        assert_eq!(insert_participant_if_open(&pool, "Art Club", "a@x.edu").await.unwrap(), 1);
        assert_eq!(insert_participant_if_open(&pool, "Art Club", "a@x.edu").await.unwrap(), 0);
        assert_eq!(insert_participant_if_open(&pool, "art club", "a@x.edu").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_only_the_named_email() {
        let pool = pool_with_activity(5).await;
        insert_participant_if_open(&pool, "Art Club", "a@x.edu").await.unwrap();
        insert_participant_if_open(&pool, "Art Club", "b@x.edu").await.unwrap();

        assert_eq!(delete_participant(&pool, "Art Club", "a@x.edu").await.unwrap(), 1);
        assert_eq!(delete_participant(&pool, "Art Club", "a@x.edu").await.unwrap(), 0);
        assert_eq!(
            load_participant_emails(&pool, "Art Club").await.unwrap(),
            vec!["b@x.edu"]
        );
    }
}
