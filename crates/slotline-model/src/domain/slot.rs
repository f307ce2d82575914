use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult, SlotKey};

/// Opaque handle to a placement defined in the external ad runtime.
///
/// The scheduling core only needs a stable element id from a slot:
/// it is used both as the display target and as the slot identity.
pub trait AdSlot: fmt::Debug + Send + Sync + 'static {
    /// Id of the container element the slot renders into.
    fn element_id(&self) -> &str;

    /// Stable identity used for interval and batch bookkeeping.
    fn key(&self) -> SlotKey {
        SlotKey::new(self.element_id())
    }
}

/// Shared reference to a slot owned by the caller.
pub type SlotHandle = Arc<dyn AdSlot>;

/// Plain slot definition: an ad unit path bound to a container element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedSlot {
    /// Full ad unit path (e.g. `/1234/site/top`).
    ad_unit: String,
    /// Container element id.
    element_id: String,
}

impl DefinedSlot {
    /// Create a slot definition.
    ///
    /// Fails when `element_id` is empty or whitespace-only: such a slot would have no identity.
    pub fn new(ad_unit: impl Into<String>, element_id: impl Into<String>) -> ModelResult<Self> {
        let element_id = element_id.into();
        if element_id.trim().is_empty() {
            return Err(ModelError::Invalid("slot element id is empty".into()));
        }
        Ok(Self {
            ad_unit: ad_unit.into(),
            element_id,
        })
    }

    /// Get the ad unit path.
    pub fn ad_unit(&self) -> &str {
        &self.ad_unit
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> SlotHandle {
        Arc::new(self)
    }
}

impl AdSlot for DefinedSlot {
    fn element_id(&self) -> &str {
        &self.element_id
    }
}
