use tasks::TaskStatus;

/// Map a raw vendor status token onto the canonical four-state lifecycle.
///
/// Two casing conventions show up in practice: lower-case tokens from the
/// OpenAI-style endpoints and upper-case tokens from the unified query
/// endpoint. Anything unrecognized is treated as `pending` so the poller
/// never declares success or permanent failure on an unfamiliar token.
pub fn normalize_status(token: &str) -> TaskStatus {
    match token {
        "pending" | "SUBMITTED" | "QUEUED" => TaskStatus::Pending,
        "processing" | "PROCESSING" => TaskStatus::Processing,
        "succeeded" | "completed" | "COMPLETED" => TaskStatus::Completed,
        "failed" | "cancelled" | "FAILED" => TaskStatus::Failed,
        _ => TaskStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vocabulary_is_total() {
        let expected = [
            ("pending", TaskStatus::Pending),
            ("processing", TaskStatus::Processing),
            ("succeeded", TaskStatus::Completed),
            ("completed", TaskStatus::Completed),
            ("failed", TaskStatus::Failed),
            ("cancelled", TaskStatus::Failed),
            ("SUBMITTED", TaskStatus::Pending),
            ("QUEUED", TaskStatus::Pending),
            ("PROCESSING", TaskStatus::Processing),
            ("COMPLETED", TaskStatus::Completed),
            ("FAILED", TaskStatus::Failed),
        ];
        for (token, status) in expected {
            assert_eq!(normalize_status(token), status, "token {token}");
        }
    }

    #[test]
    fn test_unknown_tokens_stay_pending() {
        for token in ["", "RUNNING", "Succeeded", "done", "error", "canceled"] {
            assert_eq!(normalize_status(token), TaskStatus::Pending, "token {token}");
        }
    }
}
