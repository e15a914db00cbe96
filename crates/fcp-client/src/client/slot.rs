//! Slot-allocating insert
//!
//! Independent inserters append to a shared `{base}-{slot}{suffix}` sequence
//! without coordinating. Each one tries the next slot it believes is free
//! and lets the node arbitrate: a collision means someone else got there
//! first, so move on to the following slot.

use tracing::{error, info};

use super::FcpClient;
use crate::error::{ClientError, Result};
use crate::outcome::{InsertOutcome, SlotAbort, SlotInsertOutcome};
use crate::payload::PayloadSource;

/// Candidate name for `slot`
pub fn slot_name(base_name: &str, slot: u32, suffix: &str) -> String {
    format!("{base_name}-{slot}{suffix}")
}

impl FcpClient {
    /// Insert `payload` under the first free slot at or after `start_slot`.
    ///
    /// Collisions advance to the next slot; any other failure, including an
    /// unreadable payload, stops immediately with
    /// [`SlotInsertOutcome::Aborted`]. The payload must be replayable
    /// (memory or file): one-shot streams are rejected without submitting
    /// anything.
    pub async fn slot_insert(
        &self,
        payload: impl Into<PayloadSource>,
        base_name: &str,
        start_slot: u32,
        suffix: &str,
    ) -> Result<SlotInsertOutcome> {
        let payload = payload.into();
        if !payload.is_replayable() {
            return Ok(SlotInsertOutcome::Aborted {
                slot: start_slot,
                reason: SlotAbort::BadInput("slot inserts need a replayable payload".to_string()),
            });
        }

        let mut slot = start_slot;
        loop {
            let name = slot_name(base_name, slot, suffix);
            info!("Trying slot insert to {name}");

            match self.insert_source(&payload, &name).await {
                Ok(InsertOutcome::Success) => {
                    info!("Insert of {name} successful");
                    return Ok(SlotInsertOutcome::Inserted { slot });
                }
                Ok(InsertOutcome::Failed(failure)) if failure.is_collision() => {
                    info!("Collision at {name}");
                    let Some(next) = slot.checked_add(1) else {
                        return Ok(SlotInsertOutcome::Aborted {
                            slot,
                            reason: SlotAbort::Exhausted,
                        });
                    };
                    slot = next;
                }
                Ok(InsertOutcome::Failed(failure)) => {
                    error!("Slot insert to {name} failed: {failure}");
                    return Ok(SlotInsertOutcome::Aborted {
                        slot,
                        reason: SlotAbort::Rejected(failure),
                    });
                }
                Err(ClientError::BadInput { reason, .. }) => {
                    error!("Slot insert to {name} has unreadable payload: {reason}");
                    return Ok(SlotInsertOutcome::Aborted {
                        slot,
                        reason: SlotAbort::BadInput(reason),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_name() {
        assert_eq!(slot_name("foo", 3, ".bin"), "foo-3.bin");
        assert_eq!(slot_name("KSK@mail", 0, ""), "KSK@mail-0");
    }
}
