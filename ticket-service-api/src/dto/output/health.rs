use serde::Serialize;
use std::collections::BTreeMap;

pub const HEALTHY: &str = "healthy";
pub const UNHEALTHY: &str = "unhealthy";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DependenciesHealth {
    pub status: &'static str,
    pub services: BTreeMap<&'static str, &'static str>,
}
