pub mod enums;
pub mod lenient;
pub mod records;
pub mod state;

pub use enums::*;
pub use records::*;
pub use state::*;
