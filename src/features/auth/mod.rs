mod jwks;
mod validator;

pub mod model;

pub use validator::JwtValidator;
#[cfg(test)]
pub use validator::KeySource;
