// Domain layer: portal entities, the result envelope and the ports adapters implement.

pub mod auth;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod result;
pub mod validation;
