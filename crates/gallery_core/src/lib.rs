pub mod domain;
pub mod generation;
pub mod ports;

pub use domain::{
    Component, ComponentChanges, ComponentDetail, ComponentFilter, ComponentMeta, ComponentStatus,
    NewComponent, SortKey, Tag, Technology, User,
};
pub use generation::{GeneratedComponent, Generation};
pub use ports::{CodeGenerationModel, ComponentStore, PortError, PortResult};
