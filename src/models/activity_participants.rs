// One roster entry; `id` order is signup order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityParticipantsRow {
    pub activity_name: String,
    pub email: String,
}
