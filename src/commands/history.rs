use crate::commands::{into_command_result, AppContext};
use crate::models::HistoryRow;
use crate::services::dashboard_engine::fetch_history;
use crate::services::history::present;
use crate::services::lifecycle::{RequestLifecycle, StartPolicy};

pub async fn get_prediction_history(ctx: &AppContext) -> Result<Vec<HistoryRow>, String> {
    let lifecycle = RequestLifecycle::new("history", StartPolicy::Restart);
    let records = into_command_result(lifecycle.run(fetch_history(ctx.transport.as_ref())).await)?;
    Ok(present(&records))
}
