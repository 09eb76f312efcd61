//! Contract bindings for the vault system. The contracts themselves live in
//! the frontend deployment, so the bindings are generated from the parts of
//! their human-readable ABIs that the scripts use.

pub mod ierc20;
pub mod manager;
pub mod vault;
