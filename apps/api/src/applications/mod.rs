// Tracked job applications: owner-scoped CRUD, dashboard stats, and the
// reminder-facing queries the scheduler runs against the same table.

pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod stats;
pub mod store;
