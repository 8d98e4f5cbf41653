pub mod dashboards;
pub mod sessions;
