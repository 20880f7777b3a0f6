// Project documentation store: create-or-update by path, list, fetch by id.

pub mod handlers;
pub mod store;
