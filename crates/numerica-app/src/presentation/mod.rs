pub mod bootstrap;
pub mod routes;
pub mod view;
