pub mod audit_logs;
pub mod cart_items;
pub mod extras;
pub mod menu_items;
pub mod orders;
pub mod profiles;
pub mod restaurant_settings;
pub mod user_roles;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use extras::Entity as Extras;
pub use menu_items::Entity as MenuItems;
pub use orders::Entity as Orders;
pub use profiles::Entity as Profiles;
pub use restaurant_settings::Entity as RestaurantSettings;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
