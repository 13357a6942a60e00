pub mod kdf;
pub mod poseidon;
pub mod stealth;
