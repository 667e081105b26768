/// Default flow path for opening a session.
pub const DEFAULT_BEGIN_PATH: &str = "personalizedOnboarding";
/// Default flow path for continuing a session.
pub const DEFAULT_CONTINUE_PATH: &str = "maintainConversationContext";

/// Joins a base URL and a flow path with exactly one `/` between them.
pub fn join_endpoint(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }

    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::join_endpoint;

    #[test]
    fn join_collapses_duplicate_slashes() {
        assert_eq!(
            join_endpoint("http://localhost:3400/", "/maintainConversationContext"),
            "http://localhost:3400/maintainConversationContext"
        );
    }

    #[test]
    fn join_keeps_base_path_segments() {
        assert_eq!(
            join_endpoint("https://sage.example/api/flows", "personalizedOnboarding"),
            "https://sage.example/api/flows/personalizedOnboarding"
        );
    }

    #[test]
    fn empty_path_returns_trimmed_base() {
        assert_eq!(join_endpoint("https://sage.example/", ""), "https://sage.example");
    }
}
