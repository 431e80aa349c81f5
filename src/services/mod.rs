pub mod admin;
pub mod backend;
pub mod catalog;
pub mod home;
pub mod infinite_scroll;
pub mod pagination;
pub mod ranking;
pub mod ratings;
pub mod scope;
pub mod search;
pub mod validity;
