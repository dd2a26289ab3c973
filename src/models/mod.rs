pub mod activities;
pub mod activity_participants;

pub use activities::{ActivitiesRow, Activity};
pub use activity_participants::ActivityParticipantsRow;
