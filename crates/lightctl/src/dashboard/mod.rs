mod alert;
#[allow(clippy::module_inception)]
mod dashboard;
mod locks;
mod render;

pub use alert::Alert;
pub use alert::AlertLog;
pub use alert::StderrAlert;
pub use dashboard::failure_message;
pub use dashboard::Dashboard;
pub use dashboard::DashboardError;
pub use dashboard::Outcome;
pub use dashboard::LOAD_FAILED;
pub use render::render;
