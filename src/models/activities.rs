use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivitiesRow {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
}

/// An activity with its roster, as exposed by the API and accepted in seed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl Activity {
    /// Builds an activity from its stored row and roster, rejecting rows whose
    /// capacity is not a positive `u32`.
    pub fn from_rows(row: ActivitiesRow, participants: Vec<String>) -> Result<Self, AppError> {
        let max_participants = u32::try_from(row.max_participants)
            .ok()
            .filter(|max| *max > 0)
            .ok_or_else(|| AppError::InvalidRecord {
                name: row.name.clone(),
                reason: format!("max_participants {} is not positive", row.max_participants),
            })?;

        Ok(Self {
            name: row.name,
            description: row.description,
            schedule: row.schedule,
            max_participants,
            participants,
        })
    }

    /// Checks the roster invariants before a record enters the store.
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |reason: String| AppError::InvalidRecord {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.max_participants == 0 {
            return Err(invalid("max_participants must be positive".to_string()));
        }
        if self.participants.len() > self.max_participants as usize {
            return Err(invalid(format!(
                "{} participants exceed capacity {}",
                self.participants.len(),
                self.max_participants
            )));
        }
        for (i, email) in self.participants.iter().enumerate() {
            if self.participants[..i].contains(email) {
                return Err(invalid(format!("duplicate participant {}", email)));
            }
        }
        Ok(())
    }

    pub fn is_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(max_participants: i64) -> ActivitiesRow {
        ActivitiesRow {
            name: "Chess Club".to_string(),
            description: "Learn strategies".to_string(),
            schedule: "Fridays".to_string(),
            max_participants,
        }
    }

    #[test]
    fn from_rows_rejects_non_positive_capacity() {
        assert!(matches!(
            Activity::from_rows(row(0), vec![]),
            Err(AppError::InvalidRecord { .. })
        ));
        assert!(matches!(
            Activity::from_rows(row(-3), vec![]),
            Err(AppError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn full_when_roster_reaches_capacity() {
        let activity = Activity::from_rows(row(2), vec!["a@x.edu".into(), "b@x.edu".into()])
            .unwrap();
        assert!(activity.is_full());
        assert!(activity.is_participant("a@x.edu"));
        assert!(!activity.is_participant("c@x.edu"));
    }

    #[test]
    fn validate_catches_duplicates_and_overflow() {
        let mut activity = Activity::from_rows(row(2), vec![]).unwrap();
        activity.participants = vec!["a@x.edu".into(), "a@x.edu".into()];
        assert!(activity.validate().is_err());

        activity.participants = vec!["a@x.edu".into(), "b@x.edu".into(), "c@x.edu".into()];
        assert!(activity.validate().is_err());

        activity.participants.pop();
        assert!(activity.validate().is_ok());
    }
}
