//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&dyn RowStore` as the first argument. Lookups read the whole
//! table and test rows one by one; there is no index.

pub mod dashboard_repo;
pub mod session_repo;

pub use dashboard_repo::DashboardRepo;
pub use session_repo::SessionRepo;
