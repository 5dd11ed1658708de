pub mod api;
pub mod oauth;
pub mod session;
pub mod tokens;

pub use api::StravaClient;
pub use oauth::{GrantType, OAuthClient};
pub use session::{AuthPhase, AuthSession};
pub use tokens::{ClientCredentials, TokenState};
