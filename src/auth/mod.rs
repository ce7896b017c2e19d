//! Authentication and authorization.
//!
//! Every protected request passes through [`Authorize`]: the [`AuthGate`]
//! resolves the session token to an active user, then [`policy::authorize`]
//! checks the user's stored role against the route's allow-list.

pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use gate::{AuthContext, AuthGate, Credentials};
pub use middleware::Authorize;
pub use service::{AuthService, LoginOutcome, PublicProfile, Registration};
pub use token::{codec_from_config, JwtTokenCodec, PlainTokenCodec, SessionPayload, TokenCodec};
