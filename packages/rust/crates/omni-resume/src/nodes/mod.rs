mod history;
mod resume;
mod sessions;
mod store;

pub(crate) use history::run_history_mode;
pub(crate) use resume::run_resume_mode;
pub(crate) use sessions::run_sessions_mode;
pub(crate) use store::{run_clear_mode, run_info_mode};
