// Domain-layer modules and shared errors/models
pub mod submission {
    pub use crate::submission::*;
}

pub mod mapping {
    pub use crate::mapping::*;
}

pub mod models {
    pub use crate::form_models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
