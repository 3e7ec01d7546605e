// Route handlers, one module per resource. Each resource splits into
// `collection` (list, create) and `record` (get, update, delete by id).
pub mod customers;
pub mod files;
pub mod health;
pub mod projects;
pub mod seed;
pub mod tasks;
pub mod upload;
