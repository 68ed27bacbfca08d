pub mod hashing;
pub mod jwt;
pub mod mail;
pub mod ordering;
pub mod rate_limit;
pub mod security;
pub mod session;
pub mod storage;
pub mod tokens;
pub mod validation;
