pub mod football;
pub mod prediction;
pub(crate) mod provider;
pub mod user;
