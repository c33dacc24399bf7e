pub mod add;
pub mod cancel;
pub mod delete;
pub mod r#do;
pub mod edit;
pub mod list;
pub mod recur;
