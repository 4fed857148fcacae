pub mod api;
pub mod config;
pub mod dashboard;
pub mod shell;

pub use api::ApiClient;
pub use api::Device;
pub use api::DeviceMap;
pub use api::HttpTransport;
pub use config::Config;
pub use config::LogLevel;
pub use dashboard::Dashboard;
pub use dashboard::Outcome;
