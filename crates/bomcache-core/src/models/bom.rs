use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Identity fields shared by every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct BaseModel {
    /// `None` until the record has been persisted.
    #[serde(default)]
    pub uuid: Option<String>,
}

impl BaseModel {
    pub fn is_persisted(&self) -> bool {
        self.uuid.as_deref().is_some_and(|uuid| !uuid.is_empty())
    }
}

/// A bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    #[serde(flatten)]
    pub base: BaseModel,
    #[serde(default)]
    pub name: Option<String>,
}

impl Bom {
    pub fn uuid(&self) -> Option<&str> {
        self.base.uuid.as_deref()
    }

    /// Name for display, empty when unset
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl Default for Bom {
    fn default() -> Self {
        default_bom()
    }
}

pub fn default_base_model() -> BaseModel {
    BaseModel { uuid: None }
}

pub fn default_bom() -> Bom {
    Bom {
        base: default_base_model(),
        name: Some(String::new()),
    }
}
