pub mod change_password;
pub mod get_profile;
pub mod update_profile;
pub mod update_user_info;
pub mod upload_profile_image;
