// Library for tests to access modules

pub mod attribution;
pub mod cgroup_repo;
pub mod collector;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod host_repo;
pub mod models;
pub mod push;
pub mod render;
pub mod routes;
pub mod sample_repo;
pub mod version;
pub mod worker;
