pub mod categories;
pub mod check;
pub mod helpers;
pub mod overrides;
pub mod rules;
