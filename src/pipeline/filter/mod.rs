pub mod normalize;
pub mod options;
pub mod patterns;
pub mod stages;

pub use normalize::*;
pub use options::*;
pub use patterns::*;
pub use stages::*;
