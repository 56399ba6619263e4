//! Synchronized course entities

mod assignment;
mod due_date_override;
mod module_item;
mod page;

pub use assignment::Assignment;
pub use due_date_override::DueDateOverride;
pub use module_item::ModuleItem;
pub use page::Page;
