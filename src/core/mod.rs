/// Business repository - validation, code generation, delete guard
pub mod business;

/// Advertisement repository - validation, active-set derivation, population
pub mod advertisement;

/// Rotation state machine and payload fingerprinting
pub mod rotation;
