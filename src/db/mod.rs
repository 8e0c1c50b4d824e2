mod reconcile;
mod repository;
mod schema;

pub use reconcile::ReconcileReport;
pub use repository::Repository;
