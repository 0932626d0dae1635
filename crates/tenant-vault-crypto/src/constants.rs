//! Hashing constants.
//!
//! Production cost parameters for Argon2id. Changing them only affects newly
//! written hashes; existing PHC strings carry their own parameters.

/// Size of the random salt in bytes
pub const SALT_SIZE: usize = 16;

/// Argon2id parameters for password hashing
pub mod argon2_params {
    use argon2::Version;

    /// Memory cost: 64 MiB
    pub const MEMORY_COST: u32 = 64 * 1024;

    /// Time cost: 3 iterations
    pub const TIME_COST: u32 = 3;

    /// Parallelism: 1 thread
    pub const PARALLELISM: u32 = 1;

    /// Output length: 32 bytes
    pub const OUTPUT_LENGTH: usize = 32;

    /// Argon2 version
    pub const VERSION: Version = Version::V0x13;
}
