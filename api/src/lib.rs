// Module layout (Clean Architecture style)
// - bootstrap: configuration and service wiring
// - infrastructure: Postgres repositories, object storage and the local image store
// - presentation: HTTP handlers and routing
// - application: ports, the upload pipeline and use cases
// - domain: user and profile image models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_support;
