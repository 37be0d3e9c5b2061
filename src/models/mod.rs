pub mod widget;

pub use widget::{LoadFuture, OverrideRecord, WidgetDescriptor, WidgetLoader};
