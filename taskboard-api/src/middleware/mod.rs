/// Tower middleware for the API server
///
/// Bearer authentication lives in `app::jwt_auth_layer` because it needs the
/// database to confirm the caller still exists.

pub mod security;
