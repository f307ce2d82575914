use slotline_core::{Command, CommandSink};
use slotline_model::SlotHandle;
use tracing::{debug, info};

/// Command sink standing in for a real ad runtime: runs every command at once and logs the calls.
#[derive(Debug, Default)]
pub struct TracingSink;

impl CommandSink for TracingSink {
    fn enqueue(&self, task: Command) {
        task();
    }

    fn refresh_slots(&self, slots: &[SlotHandle]) {
        let ids: Vec<&str> = slots.iter().map(|s| s.element_id()).collect();
        info!(slots = ?ids, "ad request");
    }

    fn refresh_all(&self) {
        info!("ad request for every slot");
    }

    fn display_slot(&self, element_id: &str) {
        debug!(slot = element_id, "display");
    }

    fn enable_single_request_mode(&self) {
        debug!("single-request mode on");
    }

    fn enable_services(&self) {
        debug!("services enabled");
    }
}
