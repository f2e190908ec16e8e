pub mod click;
pub mod link;
pub mod short_code;
pub mod user;

pub use click::Entity as ClickEntity;
pub use link::Entity as LinkEntity;
pub use short_code::Entity as ShortCodeEntity;
pub use user::Entity as UserEntity;
