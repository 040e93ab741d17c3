//! Bearer-token authentication
//!
//! Tokens are obtained out-of-band via `GET /api/restaurant/{uid}` and
//! presented as `Authorization: Bearer <token>` on every other
//! endpoint. Requests without a valid token are rejected before any
//! store access.

mod jwt;

pub use jwt::{AuthUser, Claims, JwtConfig, JwtError, JwtService};
