/// Backend target used when the client is opened from a loopback host.
pub const LOCAL_DEV_BASE_URL: &str = "http://localhost:8000";

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Resolve the base URL that API paths such as `/chat` are appended to.
///
/// First match wins: a non-empty override is used verbatim, a loopback host
/// talks to the local backend directly, anything else gets `""` so requests
/// stay same-origin and go through the deployment's reverse proxy.
pub fn resolve_base_url(override_url: Option<&str>, host: &str) -> String {
    match override_url {
        Some(url) if !url.is_empty() => url.to_string(),
        _ if LOOPBACK_HOSTS.contains(&host) => LOCAL_DEV_BASE_URL.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_regardless_of_host() {
        for host in ["localhost", "127.0.0.1", "example.com", ""] {
            assert_eq!(resolve_base_url(Some("https://x"), host), "https://x");
        }
    }

    #[test]
    fn loopback_hosts_use_local_backend() {
        assert_eq!(resolve_base_url(None, "localhost"), "http://localhost:8000");
        assert_eq!(resolve_base_url(None, "127.0.0.1"), "http://localhost:8000");
    }

    #[test]
    fn empty_override_is_ignored() {
        assert_eq!(resolve_base_url(Some(""), "localhost"), "http://localhost:8000");
        assert_eq!(resolve_base_url(Some(""), "example.com"), "");
    }

    #[test]
    fn other_hosts_stay_same_origin() {
        assert_eq!(resolve_base_url(None, "example.com"), "");
        assert_eq!(resolve_base_url(None, "localhost.example.com"), "");
    }
}
