pub mod blocklist;
pub mod catalog;
pub mod export;
pub mod extraction;
pub mod loader;

pub use crate::domain::model::{HospitalCard, HospitalInfo, HospitalRecord, IndexedCard, RawRow};
pub use crate::domain::ports::{ConfigProvider, Located, Storage};
pub use crate::utils::error::Result;
