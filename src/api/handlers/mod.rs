pub mod health;
pub use self::health::health;

pub mod protected;
pub use self::protected::protected;
