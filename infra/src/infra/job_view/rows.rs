use command_utils::util::datetime;
use model::View;

// db row definitions
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct JobViewRow {
    pub id: i64,
    pub job_id: String,
    pub user_id: String,
    pub view_date: i64,
}

impl JobViewRow {
    pub fn to_view(&self) -> View {
        View {
            user_id: self.user_id.clone(),
            view_date: datetime::from_epoch_milli(self.view_date),
        }
    }
}
