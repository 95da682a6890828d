//! Transient user-facing notifications.
//!
//! Every surfaced failure becomes a notice with a short title and a
//! one-line description; nothing is silently swallowed. Notices also go
//! through `tracing` for the log.

/// Print a success notice.
pub fn success(title: &str, detail: &str) {
    println!("✔ {}: {}", title, detail);
    tracing::info!(title, detail, "notice");
}

/// Print a failure notice.
pub fn error(title: &str, detail: &str) {
    println!("✖ {}: {}", title, detail);
    tracing::warn!(title, detail, "notice");
}
