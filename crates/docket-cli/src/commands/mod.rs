pub mod add;
pub mod dashboard;
pub mod describe;
pub mod r#do;
pub mod history;
pub mod register;
pub mod template;
pub mod upcoming;
