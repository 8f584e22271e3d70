// Patient identity state and per-patient flow locking

pub mod store;

pub use store::{IdentityStore, PatientGuard};
