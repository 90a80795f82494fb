pub mod casing;
pub mod config;
pub mod credentials;
pub mod denormalize;
pub mod directory;
pub mod error;
pub mod features;
pub mod fixture;
pub mod identity;
pub mod model;
pub mod session;
