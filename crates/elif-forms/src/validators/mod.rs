//! Built-in validators for common form fields

pub mod composite;
pub mod csrf;
pub mod datetime;
pub mod email;
pub mod exists;
pub mod ip;
pub mod lambda;
pub mod length;
pub mod pattern;
pub mod select;

pub use composite::{DictValidator, ListValidator, MapValidator};
pub use csrf::CsrfValidator;
pub use datetime::{DateValidator, TimeValidator};
pub use email::EmailValidator;
pub use exists::ExistsValidator;
pub use ip::{AddressFamily, IpAddressValidator};
pub use lambda::{LambdaFilterValidator, LambdaMapValidator, Matches};
pub use length::LengthValidator;
pub use pattern::PatternValidator;
pub use select::SelectValidator;
