pub mod component;
pub mod entity;
pub mod store;
pub mod view;

pub use component::Component;
pub use entity::Entity;
pub use store::{Builder, Store};
pub use view::{Param, ReadOnly, Select, View};
