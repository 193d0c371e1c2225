//! Endpoint derivation
//!
//! Resource endpoints live next to the token endpoint: for a token URL of
//! `https://id.example.com/oauth/token` the users collection is
//! `https://id.example.com/oauth/users`. The token URL is split once, when the
//! client is configured, into a base prefix (`https://id.example.com/oauth/`)
//! and the `token` segment. Deriving an endpoint appends a relative resource
//! path to that prefix.

use trusted_oauth_domain::{
    ClientError, Result, FIND_USER_PATH, INTROSPECT_PATH, TOKEN_PATH_SEGMENT, USERS_PATH,
};
use url::Url;

/// How a new user is registered through `users?type=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupKind {
    Gmail,
    Facebook,
    AccountKit,
}

impl SignupKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Facebook => "facebook",
            Self::AccountKit => "account-kit",
        }
    }
}

/// Token endpoint plus the prefix resource endpoints are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    token_url: Url,
    base: String,
}

impl Endpoints {
    /// Parse and validate a token URL
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the URL does not parse, is not http(s),
    /// carries a query or fragment, or its last path segment is not `token`.
    pub fn from_token_url(token_url: &str) -> Result<Self> {
        let url = Url::parse(token_url.trim())
            .map_err(|e| ClientError::Config(format!("invalid token URL '{token_url}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "token URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::Config(format!(
                "token URL must not carry a query or fragment: {url}"
            )));
        }

        let path = url.path();
        let Some(prefix) = path.strip_suffix(TOKEN_PATH_SEGMENT).filter(|p| p.ends_with('/'))
        else {
            return Err(ClientError::Config(format!(
                "token URL path must end with '/{TOKEN_PATH_SEGMENT}', got '{path}'"
            )));
        };

        let mut base_url = url.clone();
        base_url.set_path(prefix);

        Ok(Self { token_url: url, base: base_url.to_string() })
    }

    /// Token endpoint used by the grant flows
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Prefix every resource path is appended to
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Endpoint for a relative resource path (may include a query string)
    ///
    /// # Errors
    /// Returns `ClientError::Config` for absolute paths, paths with a scheme,
    /// or paths containing dot segments.
    pub fn derive(&self, resource_path: &str) -> Result<Url> {
        let path_part = resource_path.split(&['?', '#'][..]).next().unwrap_or_default();

        if resource_path.is_empty()
            || resource_path.starts_with('/')
            || resource_path.contains("://")
            || path_part.split('/').any(is_dot_segment)
        {
            return Err(ClientError::Config(format!(
                "resource path must be relative and non-empty, got '{resource_path}'"
            )));
        }

        Url::parse(&format!("{}{resource_path}", self.base)).map_err(|e| {
            ClientError::Config(format!("invalid resource path '{resource_path}': {e}"))
        })
    }

    /// `users`
    pub fn users(&self) -> Result<Url> {
        self.derive(USERS_PATH)
    }

    /// `users/{id}`
    pub fn user(&self, user_id: &str) -> Result<Url> {
        self.derive(&user_path(user_id, None)?)
    }

    /// `users/{id}/{action}`
    pub fn user_action(&self, user_id: &str, action: &str) -> Result<Url> {
        self.derive(&user_path(user_id, Some(action))?)
    }

    /// `users?type={kind}`
    pub fn signup(&self, kind: SignupKind) -> Result<Url> {
        self.derive(&format!("{USERS_PATH}?type={}", kind.as_str()))
    }

    /// `find-user`
    pub fn find_user(&self) -> Result<Url> {
        self.derive(FIND_USER_PATH)
    }

    /// `introspect`
    pub fn introspect(&self) -> Result<Url> {
        self.derive(INTROSPECT_PATH)
    }
}

fn user_path(user_id: &str, action: Option<&str>) -> Result<String> {
    if user_id.is_empty() || is_dot_segment(user_id) {
        return Err(ClientError::Config(format!("invalid user id '{user_id}'")));
    }

    // percent-encode so the id stays a single path segment
    let id = urlencoding::encode(user_id);
    Ok(match action {
        Some(action) => format!("{USERS_PATH}/{id}/{action}"),
        None => format!("{USERS_PATH}/{id}"),
    })
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::from_token_url("https://x/oauth/token").unwrap()
    }

    #[test]
    fn derives_resource_next_to_token_segment() {
        let url = endpoints().derive("users/42").unwrap();
        assert_eq!(url.as_str(), "https://x/oauth/users/42");
    }

    #[test]
    fn keeps_token_url_for_grants() {
        let endpoints = endpoints();
        assert_eq!(endpoints.token_url().as_str(), "https://x/oauth/token");
        assert_eq!(endpoints.base(), "https://x/oauth/");
    }

    #[test]
    fn derives_every_named_endpoint() {
        let e = endpoints();
        assert_eq!(e.users().unwrap().as_str(), "https://x/oauth/users");
        assert_eq!(e.user("42").unwrap().as_str(), "https://x/oauth/users/42");
        assert_eq!(
            e.user_action("42", "update").unwrap().as_str(),
            "https://x/oauth/users/42/update"
        );
        assert_eq!(
            e.user_action("42", "change-password").unwrap().as_str(),
            "https://x/oauth/users/42/change-password"
        );
        assert_eq!(
            e.user_action("42", "set-username-password").unwrap().as_str(),
            "https://x/oauth/users/42/set-username-password"
        );
        assert_eq!(e.find_user().unwrap().as_str(), "https://x/oauth/find-user");
        assert_eq!(e.introspect().unwrap().as_str(), "https://x/oauth/introspect");
        assert_eq!(
            e.signup(SignupKind::Gmail).unwrap().as_str(),
            "https://x/oauth/users?type=gmail"
        );
        assert_eq!(
            e.signup(SignupKind::Facebook).unwrap().as_str(),
            "https://x/oauth/users?type=facebook"
        );
        assert_eq!(
            e.signup(SignupKind::AccountKit).unwrap().as_str(),
            "https://x/oauth/users?type=account-kit"
        );
    }

    #[test]
    fn token_at_root_and_with_port() {
        let e = Endpoints::from_token_url("http://localhost:8080/token").unwrap();
        assert_eq!(e.derive("introspect").unwrap().as_str(), "http://localhost:8080/introspect");
    }

    #[test]
    fn only_final_token_segment_is_replaced() {
        // a "token" substring elsewhere in the URL is left alone
        let e = Endpoints::from_token_url("https://token.example.com/tokens/v1/token").unwrap();
        assert_eq!(
            e.derive("users/1").unwrap().as_str(),
            "https://token.example.com/tokens/v1/users/1"
        );
    }

    #[test]
    fn rejects_base_without_token_segment() {
        for bad in [
            "https://x/oauth/authorize",
            "https://x/oauth/mytoken",
            "https://x/oauth/token/",
            "https://x/",
        ] {
            let err = Endpoints::from_token_url(bad).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_unusable_urls() {
        for bad in [
            "",
            "not a url",
            "ftp://x/oauth/token",
            "https://x/oauth/token?x=1",
            "https://x/oauth/token#frag",
        ] {
            assert!(
                matches!(Endpoints::from_token_url(bad), Err(ClientError::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_escaping_resource_paths() {
        let e = endpoints();
        for bad in ["", "/users", "https://evil/users", "../admin", "users/%2E%2E/admin", "./x"] {
            assert!(matches!(e.derive(bad), Err(ClientError::Config(_))), "{bad} should fail");
        }
    }

    #[test]
    fn user_ids_stay_a_single_segment() {
        let e = endpoints();
        assert_eq!(e.user("a/b").unwrap().as_str(), "https://x/oauth/users/a%2Fb");
        assert!(matches!(e.user(".."), Err(ClientError::Config(_))));
        assert!(matches!(e.user(""), Err(ClientError::Config(_))));
        assert_eq!(
            e.user_action("id with space", "update").unwrap().as_str(),
            "https://x/oauth/users/id%20with%20space/update"
        );
    }
}
