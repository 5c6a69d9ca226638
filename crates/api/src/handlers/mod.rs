//! Request handlers, one module per resource.

pub mod campaigns;
pub mod instances;
pub mod warming;
