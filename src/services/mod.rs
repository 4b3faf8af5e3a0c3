pub mod build_kubernetes;
pub mod cluster;
pub mod containers;
pub mod kubernetes;
pub mod resources;
