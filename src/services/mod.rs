pub mod formatter;
pub mod notifier;
