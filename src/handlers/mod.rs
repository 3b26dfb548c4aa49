pub(crate) mod auth;
pub(crate) mod fixtures;
pub(crate) mod predictions;
pub(crate) mod proxy;
