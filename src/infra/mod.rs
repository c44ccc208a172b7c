pub mod event_log_adapter;

pub use event_log_adapter::FileEventLogAdapter;
