//! Row structs decoded with `FromRow` and converted into `todo_core` types.

pub mod category;
pub mod task;
