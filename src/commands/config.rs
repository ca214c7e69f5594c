use super::Host;

/// Show the connection settings and context limits in effect.
pub fn show(host: &Host) {
    let policy = host.session.policy();
    println!(
        "Endpoint: {}\n\
         Model: {}\n\
         API key: {}\n\
         Timeout: {}s\n\
         History window: {} turns\n\
         Page ceiling: {} pages\n\
         Preview: {} chars",
        host.config.endpoint,
        host.config.model,
        if host.config.api_key.is_some() { "set" } else { "not set" },
        host.config.timeout.as_secs(),
        policy.history_window,
        policy.page_ceiling,
        policy.preview_chars,
    );
}
