pub mod assign;
pub mod css;
pub mod detect;
pub mod discover;
pub mod extract;
pub mod logo;
pub mod pool;
pub mod screenshot;
pub mod select;
pub mod site;
