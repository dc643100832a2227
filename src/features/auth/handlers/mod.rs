pub mod auth_handler;

pub use auth_handler::{
    __path_get_me, __path_login, __path_logout_all_devices, __path_logout_one_device,
    __path_register, __path_register_admin, __path_upgrade_user_to_admin, get_me, login,
    logout_all_devices, logout_one_device, register, register_admin, upgrade_user_to_admin,
};
