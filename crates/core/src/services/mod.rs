//! Rule engines.
//!
//! Each service owns a handle to the [`Store`](crate::store::Store) and runs
//! every operation inside exactly one gateway transaction. Mutations commit
//! only after all of their checks pass; an early return drops the gateway
//! and rolls the transaction back.

mod category;
mod task;

pub use category::CategoryService;
pub use task::TaskService;
