//! Messages sent to actors outside of a command's own result

/// Confirmation to the requester once a request is registered
pub fn request_sent(target_name: &str) -> String {
    format!("Teleport to {} has been requested.", target_name)
}

/// Prompt shown to the target of a request
pub fn request_prompt(requester_name: &str, timeout_secs: u64) -> String {
    format!(
        "{name} has requested to teleport to your home:\n \
         [Accept] /tpaccept {name} [Deny] /tpdeny {name}.\n\
         This request will time out in {secs} seconds.",
        name = requester_name,
        secs = timeout_secs
    )
}

/// Sent to the requester when nobody answered in time
pub fn request_timed_out(target_name: &str) -> String {
    format!("Teleport request to {} has timed out.", target_name)
}

/// Sent to the requester when the target accepts
pub fn request_accepted(target_name: &str) -> String {
    format!("{} has accepted your teleport request.", target_name)
}

/// Sent to the requester when the target denies
pub fn request_denied(target_name: &str) -> String {
    format!("{} has denied your teleport request.", target_name)
}

/// Sent to one requester whose accepted request could not be carried out
pub fn request_failed(target_name: &str, reason: &str) -> String {
    format!("Teleport to {} has failed: {}", target_name, reason)
}
