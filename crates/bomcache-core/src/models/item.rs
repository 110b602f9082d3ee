use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::bom::{default_base_model, BaseModel, Bom};

/// A line item of a bill of materials.
///
/// `bom_uuid` is a weak reference to the owning `Bom`; nothing checks that
/// the referenced record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(flatten)]
    pub base: BaseModel,
    #[serde(default)]
    pub bom_uuid: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub qty: Option<f64>,
}

impl Item {
    pub fn uuid(&self) -> Option<&str> {
        self.base.uuid.as_deref()
    }

    /// Whether this item points at `bom`. Never true when either uuid is unset.
    pub fn belongs_to(&self, bom: &Bom) -> bool {
        match (self.bom_uuid.as_deref(), bom.uuid()) {
            (Some(link), Some(uuid)) => link == uuid,
            _ => false,
        }
    }
}

impl Default for Item {
    fn default() -> Self {
        default_item()
    }
}

pub fn default_item() -> Item {
    Item {
        base: default_base_model(),
        bom_uuid: None,
        link: Some(String::new()),
        name: Some(String::new()),
        price: Some(0.0),
        qty: Some(0.0),
    }
}
