//! Build-time Configuration
//!
//! Backend endpoint, public key, team scope, and the magic-link redirect
//! target. All externally supplied; baked in at compile time.

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the hosted backend, without a trailing slash.
    pub supabase_url: String,
    /// Public (anon) API key.
    pub anon_key: String,
    /// Partition key isolating this team's entries and files.
    pub team_id: String,
    /// Where magic links land after the user clicks them.
    pub redirect_to: String,
}

impl Config {
    pub fn from_build_env() -> Self {
        Self::new(
            option_env!("SUPABASE_URL").unwrap_or("https://demo.supabase.co"),
            option_env!("SUPABASE_ANON_KEY").unwrap_or("demo-key"),
            option_env!("TEAM_ID").unwrap_or("demo-team"),
            option_env!("MAGIC_LINK_REDIRECT").unwrap_or("http://localhost:8080"),
        )
    }

    pub fn new(supabase_url: &str, anon_key: &str, team_id: &str, redirect_to: &str) -> Self {
        Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            team_id: team_id.to_string(),
            redirect_to: redirect_to.to_string(),
        }
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.supabase_url)
    }

    /// WebSocket endpoint for the realtime channel.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.supabase_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.supabase_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.supabase_url.clone()
        };
        format!("{ws_base}/realtime/v1/websocket")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = Config::new("https://x.supabase.co/", "k", "t", "r");
        assert_eq!(config.rest_url(), "https://x.supabase.co/rest/v1");
    }

    #[test]
    fn realtime_url_switches_scheme() {
        let config = Config::new("https://x.supabase.co", "k", "t", "r");
        assert_eq!(config.realtime_url(), "wss://x.supabase.co/realtime/v1/websocket");

        let local = Config::new("http://localhost:54321", "k", "t", "r");
        assert_eq!(local.realtime_url(), "ws://localhost:54321/realtime/v1/websocket");
    }
}
