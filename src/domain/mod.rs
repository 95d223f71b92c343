mod item;
mod task;

pub use item::Item;
pub use task::MonitoringTask;

pub(crate) use item::stringish;
