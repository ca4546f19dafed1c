pub mod filename;
pub mod hash;
pub mod jwt;
pub mod random;
pub mod username;
