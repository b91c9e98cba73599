pub mod update_profile;
