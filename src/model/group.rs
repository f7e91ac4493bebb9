
use crate::model::wire::WireGroup;

/// The matchday the competition is currently in, as reported by `getcurrentgroup`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentGroup {
    pub group_name: Option<String>,
    pub group_order_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl CurrentGroup {
    /// The matchday number, if the lookup produced a usable one.
    pub fn matchday(&self) -> Option<u32> {
        self.group_order_id
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
    }
}

impl From<WireGroup> for CurrentGroup {
    fn from(wire: WireGroup) -> Self {
        Self {
            group_name: wire.group_name,
            group_order_id: wire.group_order_id,
            group_id: wire.group_id,
        }
    }
}
