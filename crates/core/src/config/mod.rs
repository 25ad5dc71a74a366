pub mod record;
pub mod resolver;
pub mod settings;
pub mod sources;
pub mod validation;

pub use record::*;
pub use resolver::*;
pub use settings::*;
pub use sources::*;
pub use validation::*;
