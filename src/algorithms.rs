pub mod connectivity;
pub mod symmetrize;
