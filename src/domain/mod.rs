// Domain layer: facility records and the ports the catalog talks through.

pub mod model;
pub mod ports;

use model::{HospitalCard, HospitalInfo, HospitalRecord, IndexedCard};
use ports::Located;

macro_rules! impl_located {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Located for $ty {
                fn address(&self) -> &str {
                    &self.address
                }

                fn prefecture(&self) -> &str {
                    &self.prefecture
                }
            }
        )*
    };
}

impl_located!(HospitalCard, HospitalInfo, IndexedCard, HospitalRecord);
