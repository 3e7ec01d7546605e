pub mod customer;
pub mod file;
pub mod fixtures;
pub mod patch;
pub mod project;
pub mod task;
pub mod validation;

pub use customer::{CreateCustomer, Customer, CustomerView, UpdateCustomer};
pub use file::{CreateFile, FileRecord, FileView, UpdateFile};
pub use project::{CreateProject, Project, ProjectView, UpdateProject};
pub use task::{CreateTask, Task, TaskView, UpdateTask};
pub use validation::InvalidDocument;

use crate::database::store::IndexSpec;

/// Every index the models declare, ensured when the store connects.
pub fn indexes() -> Vec<IndexSpec> {
    [customer::INDEXES, project::INDEXES, task::INDEXES, file::INDEXES]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
}
