pub mod assignments;
pub mod health;
pub mod menus;
pub mod modules;
