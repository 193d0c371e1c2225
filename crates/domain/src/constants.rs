//! Protocol constants
//!
//! Grant types, classification codes and the endpoint naming used by the
//! identity service.

// Grant types sent as `grant_type`
pub const GRANT_TYPE_PASSWORD: &str = "password";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Classification code attached to password-grant failures so callers can
/// tell rejected credentials apart from other remote errors.
pub const WRONG_USERNAME_PASSWORD: &str = "wrong_username_password";

/// Final path segment every configured token URL must end with. Resource
/// endpoints are siblings of this segment.
pub const TOKEN_PATH_SEGMENT: &str = "token";

// Resource endpoint paths, relative to the token URL's parent
pub const USERS_PATH: &str = "users";
pub const FIND_USER_PATH: &str = "find-user";
pub const INTROSPECT_PATH: &str = "introspect";

// Request timeout applied by the default transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
