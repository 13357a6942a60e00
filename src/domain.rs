pub mod announcement;
pub mod commitment;
pub mod keys;
pub mod merkle;
pub mod note;
pub mod nullifier;
pub mod operation;
pub mod scan;
pub mod stealth;
pub mod witness;
