pub mod model;
pub mod naming;
pub mod validate;
